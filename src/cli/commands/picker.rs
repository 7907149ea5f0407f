//! Decoration picker rendering.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Decoration};
use crate::domain::ports::DecorApi;
use crate::services::{DecorationPicker, PickerItem, PickerSection};

/// Hash value meaning "no decoration" for `--try-on`
const NONE_HASH: &str = "none";

#[derive(Args, Debug)]
pub struct PickerArgs {
    /// Preview a decoration by hash, or "none", without applying it
    #[arg(short, long)]
    pub try_on: Option<String>,

    /// Apply the previewed decoration
    #[arg(long, requires = "try_on")]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
pub struct PickerItemOutput {
    pub key: String,
    #[serde(flatten)]
    pub item: PickerItem,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct PickerSectionOutput {
    pub title: String,
    pub subtitle: Option<String>,
    pub items: Vec<PickerItemOutput>,
}

#[derive(Debug, Serialize)]
pub struct PickerOutput {
    pub sections: Vec<PickerSectionOutput>,
    pub active: Option<Decoration>,
    pub active_preset: Option<String>,
    pub applied: bool,
}

impl PickerOutput {
    fn new(picker: &DecorationPicker, applied: bool) -> Self {
        let sections = picker
            .sections()
            .into_iter()
            .map(|section| section_output(picker, section))
            .collect();

        Self {
            sections,
            active: picker.active().cloned(),
            active_preset: picker.active_preset().map(|p| p.name.clone()),
            applied,
        }
    }
}

fn section_output(picker: &DecorationPicker, section: PickerSection) -> PickerSectionOutput {
    let items = (0..section.items.len())
        .filter_map(|index| {
            let key = section.item_key(index)?;
            let item = section.items[index].clone();
            Some(PickerItemOutput {
                key,
                selected: picker.is_selected(&item),
                item,
            })
        })
        .collect();

    PickerSectionOutput {
        title: section.title,
        subtitle: section.subtitle,
        items,
    }
}

fn item_label(item: &PickerItem) -> String {
    match item {
        PickerItem::None => "(none)".to_string(),
        PickerItem::Create { blocked: false } => "(create)".to_string(),
        PickerItem::Create { blocked: true } => "(create, blocked while pending review)".to_string(),
        PickerItem::Decoration {
            decoration,
            pending_review,
        } => {
            let mut label = match &decoration.alt {
                Some(alt) => format!("{} {}", decoration.hash, console::style(alt).dim()),
                None => decoration.hash.clone(),
            };
            if *pending_review {
                label.push_str(&format!(" {}", console::style("(pending review)").yellow()));
            }
            label
        }
    }
}

impl CommandOutput for PickerOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            lines.push(console::style(&section.title).bold().to_string());
            if let Some(subtitle) = &section.subtitle {
                lines.push(format!("  {}", console::style(subtitle).dim()));
            }
            for item in &section.items {
                let marker = if item.selected { ">" } else { " " };
                lines.push(format!("{marker} {}", item_label(&item.item)));
            }
            lines.push(String::new());
        }

        match (&self.active, &self.active_preset) {
            (Some(active), Some(preset)) => {
                lines.push(format!("Active: {} (part of the {preset} preset)", active.hash));
            }
            (Some(active), None) => lines.push(format!("Active: {}", active.hash)),
            (None, _) => lines.push("Active: none".to_string()),
        }
        if self.applied {
            lines.push("Applied.".to_string());
        }

        lines.join("\n")
    }
}

pub async fn execute(args: PickerArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let store = ctx.current_user_store();

    let (fetched, presets) = tokio::join!(store.fetch(), ctx.client.presets());
    fetched.context("Failed to load your decorations")?;
    let presets = presets.context("Failed to fetch presets")?;

    let mut picker = DecorationPicker::new(store.decorations(), presets, store.selected());

    if let Some(hash) = args.try_on {
        let decoration = if hash == NONE_HASH {
            None
        } else {
            let found = picker
                .sections()
                .into_iter()
                .flat_map(|s| s.items)
                .find_map(|item| match item {
                    PickerItem::Decoration { decoration, .. } if decoration.hash == hash => {
                        Some(decoration)
                    }
                    _ => None,
                });
            Some(found.ok_or_else(|| anyhow!("Decoration not found: {hash}"))?)
        };
        picker
            .try_on(decoration)
            .with_context(|| format!("Cannot try on decoration {hash}"))?;
    }

    let mut applied = false;
    if args.apply {
        if let Some(selection) = picker.pending_selection() {
            store.select(selection).await?;
            applied = true;
        }
    }

    output(&PickerOutput::new(&picker, applied), json_mode);
    Ok(())
}
