//! Preset catalog listing.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::table::{list_table, render_list};
use crate::domain::models::{Config, Preset};
use crate::domain::ports::DecorApi;

#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Also list the decorations of each preset
    #[arg(short, long)]
    pub decorations: bool,
}

#[derive(Debug, Serialize)]
pub struct PresetsOutput {
    pub presets: Vec<Preset>,
    #[serde(skip)]
    pub show_decorations: bool,
}

impl CommandOutput for PresetsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "decorations", "authors", "description"]);
        for preset in &self.presets {
            table.add_row(vec![
                preset.id.clone(),
                preset.name.clone(),
                preset.decorations.len().to_string(),
                preset.author_ids.len().to_string(),
                truncate(preset.description.as_deref().unwrap_or(""), 40),
            ]);
        }

        let mut rendered = render_list("preset", &table, self.presets.len());
        if self.show_decorations {
            for preset in &self.presets {
                rendered.push_str(&format!("\n\n{}:", preset.name));
                for decoration in &preset.decorations {
                    rendered.push_str(&format!(
                        "\n  {}  {}",
                        decoration.hash,
                        decoration.alt.as_deref().unwrap_or("")
                    ));
                }
            }
        }
        rendered
    }
}

pub async fn execute(args: PresetsArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let presets = ctx.client.presets().await.context("Failed to fetch presets")?;

    output(
        &PresetsOutput {
            presets,
            show_decorations: args.decorations,
        },
        json_mode,
    );
    Ok(())
}
