//! Adapters implementing domain ports outside of HTTP.

pub mod memory;
