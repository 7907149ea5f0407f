//! CLI command implementations.

pub mod config;
pub mod decorations;
pub mod picker;
pub mod presets;
pub mod users;
