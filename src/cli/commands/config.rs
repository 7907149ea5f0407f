//! Configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets redacted
    Show,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub config: serde_json::Value,
}

impl ConfigOutput {
    pub fn new(config: &Config) -> Result<Self> {
        let mut value = serde_json::to_value(config)?;
        if let Some(token) = value.pointer_mut("/api/token") {
            if !token.is_null() {
                *token = serde_json::Value::String("[REDACTED]".to_string());
            }
        }
        Ok(Self { config: value })
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        self.config.clone()
    }
}

pub fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => output(&ConfigOutput::new(config)?, json_mode),
    }
    Ok(())
}
