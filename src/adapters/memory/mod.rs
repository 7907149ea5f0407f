//! In-memory adapters for hosts that keep their users in process.

pub mod user_registry;

pub use user_registry::InMemoryUserRegistry;
