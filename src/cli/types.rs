//! CLI type definitions
//!
//! This module contains the top-level clap structures; each command owns its
//! own argument types.

use clap::{Parser, Subcommand};

use crate::cli::commands::config::ConfigArgs;
use crate::cli::commands::decorations::DecorationsArgs;
use crate::cli::commands::picker::PickerArgs;
use crate::cli::commands::presets::PresetsArgs;
use crate::cli::commands::users::UsersArgs;

#[derive(Parser)]
#[command(name = "decor")]
#[command(about = "Decor - avatar decoration client", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .decor/
    #[arg(short, long, global = true, env = "DECOR_CONFIG")]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up the decorations worn by users
    Users(UsersArgs),

    /// Browse the preset catalog
    Presets(PresetsArgs),

    /// Manage your own decorations
    Decorations(DecorationsArgs),

    /// Show the decoration picker
    Picker(PickerArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}
