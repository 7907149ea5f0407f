//! Domain layer for the decoration client
//!
//! Core models, error types and the port traits that infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DecorError, DecorResult};
