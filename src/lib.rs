//! Decor - avatar decoration client
//!
//! Resolves the avatar decorations worn by users through a debounced, batched
//! lookup cache, and manages the signed-in user's own decorations and the
//! preset catalog.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the ports to the outside world
//! - **Service Layer** (`services`): The decoration caches, picker and event bus
//! - **Adapters** (`adapters`): In-memory implementations of host-side ports
//! - **Infrastructure Layer** (`infrastructure`): HTTP client, configuration, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use decor::{Config, UsersDecorationsStore, UserId};
//! use decor::domain::ports::NoopListener;
//! use decor::infrastructure::decor::{DecorClient, DecorClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let client = Arc::new(DecorClient::new(DecorClientConfig::from_config(&config))?);
//!     let store = UsersDecorationsStore::new(client, Arc::new(NoopListener), &config.cache);
//!
//!     let decorations = store.resolve_many(&[UserId::from("1"), UserId::from("2")]).await?;
//!     println!("{decorations:?}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DecorError, DecorResult};
pub use domain::models::{
    AvatarDecoration, CacheConfig, Config, Decoration, DecorationId, LiveUser, NewDecoration,
    Preset, UserId,
};
pub use domain::ports::{DecorApi, DecorationListener, UserRegistry, UsersDecorationsLookup};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    BatchOutcome, BatchReport, CurrentUserDecorationsStore, DecorationPicker, EventBus,
    UsersDecorationsStore,
};
