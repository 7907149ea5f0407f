//! Management of the signed-in user's decorations.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::table::{list_table, render_list, review_status};
use crate::domain::models::{Config, Decoration, DecorationFile, NewDecoration};
use crate::domain::ports::DecorApi;

#[derive(Args, Debug)]
pub struct DecorationsArgs {
    #[command(subcommand)]
    pub command: DecorationsCommands,
}

#[derive(Subcommand, Debug)]
pub enum DecorationsCommands {
    /// List your decorations and the one you are wearing
    List,
    /// Upload a new decoration (PNG or APNG, at most 1 MiB)
    Create {
        /// Image file
        file: PathBuf,
        /// Alternative text describing the decoration
        #[arg(short, long)]
        alt: String,
    },
    /// Delete one of your decorations
    Delete {
        /// Decoration hash
        hash: String,
    },
    /// Wear a decoration, either your own or one from a preset
    Select {
        /// Decoration hash
        hash: String,
    },
    /// Stop wearing a decoration
    ClearSelection,
}

#[derive(Debug, Serialize)]
pub struct DecorationListOutput {
    pub decorations: Vec<Decoration>,
    pub selected: Option<String>,
    pub has_pending_review: bool,
}

impl CommandOutput for DecorationListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["", "hash", "alt", "animated", "status"]);
        for decoration in &self.decorations {
            let marker = if self.selected.as_deref() == Some(decoration.hash.as_str()) {
                "*"
            } else {
                ""
            };
            table.add_row(vec![
                marker.to_string(),
                decoration.hash.clone(),
                truncate(decoration.alt.as_deref().unwrap_or(""), 32),
                decoration.animated.to_string(),
                review_status(decoration.reviewed),
            ]);
        }

        let mut rendered = render_list("decoration", &table, self.decorations.len());
        if self.has_pending_review {
            rendered.push_str("\n\nA decoration is pending review; creating another is blocked until it is reviewed.");
        }
        rendered
    }
}

#[derive(Debug, Serialize)]
pub struct DecorationActionOutput {
    pub success: bool,
    pub message: String,
    pub decoration: Option<Decoration>,
}

impl CommandOutput for DecorationActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: DecorationsArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let store = ctx.current_user_store();
    store
        .fetch()
        .await
        .context("Failed to load your decorations")?;

    match args.command {
        DecorationsCommands::List => {
            let out = DecorationListOutput {
                decorations: store.decorations(),
                selected: store.selected().map(|d| d.hash),
                has_pending_review: store.has_pending_review(),
            };
            output(&out, json_mode);
        }

        DecorationsCommands::Create { file, alt } => {
            let file = DecorationFile::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let created = store.create(NewDecoration::new(alt, file)).await?;

            let out = DecorationActionOutput {
                success: true,
                message: format!(
                    "Decoration created: {} (pending review before it can be worn)",
                    created.hash
                ),
                decoration: Some(created),
            };
            output(&out, json_mode);
        }

        DecorationsCommands::Delete { hash } => {
            let decoration = store
                .decorations()
                .into_iter()
                .find(|d| d.hash == hash)
                .ok_or_else(|| anyhow!("Decoration not found: {hash}"))?;
            store.delete(&hash).await?;

            let out = DecorationActionOutput {
                success: true,
                message: format!("Decoration deleted: {hash}"),
                decoration: Some(decoration),
            };
            output(&out, json_mode);
        }

        DecorationsCommands::Select { hash } => {
            let decoration = match store.decorations().into_iter().find(|d| d.hash == hash) {
                Some(decoration) => decoration,
                None => ctx
                    .client
                    .presets()
                    .await
                    .context("Failed to fetch presets")?
                    .into_iter()
                    .flat_map(|p| p.decorations)
                    .find(|d| d.hash == hash)
                    .ok_or_else(|| anyhow!("Decoration not found: {hash}"))?,
            };
            store.select(Some(decoration.clone())).await?;

            let out = DecorationActionOutput {
                success: true,
                message: format!("Now wearing decoration: {hash}"),
                decoration: Some(decoration),
            };
            output(&out, json_mode);
        }

        DecorationsCommands::ClearSelection => {
            store.select(None).await?;

            let out = DecorationActionOutput {
                success: true,
                message: "No longer wearing a decoration".to_string(),
                decoration: None,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
