//! Decor CLI entry point.

use anyhow::Result;
use clap::Parser;

use decor::cli::{handle_error, Cli, Commands};
use decor::infrastructure::config::ConfigLoader;
use decor::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Users(args) => decor::cli::commands::users::execute(args, config, cli.json).await,
        Commands::Presets(args) => {
            decor::cli::commands::presets::execute(args, config, cli.json).await
        }
        Commands::Decorations(args) => {
            decor::cli::commands::decorations::execute(args, config, cli.json).await
        }
        Commands::Picker(args) => decor::cli::commands::picker::execute(args, config, cli.json).await,
        Commands::Config(args) => decor::cli::commands::config::execute(args, &config, cli.json),
    }
}
