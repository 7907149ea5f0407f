//! Command-line interface for the decoration client.

pub mod commands;
pub mod context;
pub mod output;
pub mod table;
pub mod types;

pub use context::AppContext;
pub use types::{Cli, Commands};

/// Report a failed command and exit with a non-zero status
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1);
}
