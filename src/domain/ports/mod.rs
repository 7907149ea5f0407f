//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the services depend on:
//! - UsersDecorationsLookup: bulk per-user decoration lookup
//! - DecorApi: current-user decoration management and the preset catalog
//! - UserRegistry: the host's in-memory users
//! - DecorationListener: hook fired when a user's decoration resolves
//!
//! Infrastructure adapters implement these so services stay independent of
//! HTTP and of the host application.

pub mod decor_api;
pub mod decoration_listener;
pub mod user_registry;

pub use decor_api::{DecorApi, UsersDecorationsLookup, UsersDecorations};
pub use decoration_listener::{DecorationListener, NoopListener};
pub use user_registry::UserRegistry;
