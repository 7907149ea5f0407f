//! Infrastructure layer module
//!
//! External integrations and process-level concerns:
//! - Decoration service HTTP client
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod decor;
pub mod logging;
