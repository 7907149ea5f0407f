//! Data model behind the decoration picker.
//!
//! Groups the user's own decorations and the preset catalog into sections and
//! tracks which decoration is being tried on before it is applied.

use serde::Serialize;

use crate::domain::errors::{DecorError, DecorResult};
use crate::domain::models::{Decoration, Preset};

/// Title of the section holding the user's own decorations
pub const OWN_DECORATIONS_TITLE: &str = "Your Decor Decorations";

const OWN_DECORATIONS_PREFIX: &str = "ownDecorations";

/// One cell of the picker grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PickerItem {
    /// Wear no decoration
    None,
    /// Start creating a decoration; blocked while another one awaits review
    Create { blocked: bool },
    /// Pending decorations are shown but cannot be picked
    Decoration {
        decoration: Decoration,
        pending_review: bool,
    },
}

impl PickerItem {
    fn decoration(decoration: &Decoration) -> Self {
        Self::Decoration {
            decoration: decoration.clone(),
            pending_review: decoration.is_pending_review(),
        }
    }

    /// Whether choosing this item changes what is worn
    pub fn is_selectable(&self) -> bool {
        match self {
            Self::None => true,
            Self::Create { .. } => false,
            Self::Decoration { pending_review, .. } => !pending_review,
        }
    }

    fn key_part(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Create { .. } => "create",
            Self::Decoration { decoration, .. } => &decoration.hash,
        }
    }
}

/// A titled group of picker items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerSection {
    pub title: String,
    pub subtitle: Option<String>,
    pub key_prefix: String,
    pub items: Vec<PickerItem>,
}

impl PickerSection {
    /// Stable key of the item at `index`
    pub fn item_key(&self, index: usize) -> Option<String> {
        self.items
            .get(index)
            .map(|item| format!("{}-{}", self.key_prefix, item.key_part()))
    }
}

/// Picker state over a snapshot of the user's decorations and the presets
#[derive(Debug, Clone, Default)]
pub struct DecorationPicker {
    decorations: Vec<Decoration>,
    presets: Vec<Preset>,
    selected: Option<Decoration>,
    /// `None` = not trying anything, `Some(None)` = trying no decoration
    trying: Option<Option<Decoration>>,
}

impl DecorationPicker {
    pub fn new(decorations: Vec<Decoration>, presets: Vec<Preset>, selected: Option<Decoration>) -> Self {
        Self {
            decorations,
            presets,
            selected,
            trying: None,
        }
    }

    /// Preview `decoration` without applying it
    ///
    /// Decorations still pending review cannot be worn and are refused.
    pub fn try_on(&mut self, decoration: Option<Decoration>) -> DecorResult<()> {
        if decoration.as_ref().is_some_and(Decoration::is_pending_review) {
            return Err(DecorError::PendingReview);
        }
        self.trying = Some(decoration);
        Ok(())
    }

    pub fn is_trying(&self) -> bool {
        self.trying.is_some()
    }

    /// The decoration that would be worn after applying: the one being tried, else the selection
    pub fn active(&self) -> Option<&Decoration> {
        match &self.trying {
            Some(trying) => trying.as_ref(),
            None => self.selected.as_ref(),
        }
    }

    /// Decoration to apply, if the user tried something on
    pub fn pending_selection(&self) -> Option<Option<Decoration>> {
        self.trying.clone()
    }

    /// Preset the active decoration belongs to
    pub fn active_preset(&self) -> Option<&Preset> {
        let preset_id = self.active()?.preset_id.as_deref()?;
        self.presets.iter().find(|p| p.id == preset_id)
    }

    /// The user's decorations that are not part of any preset
    pub fn own_decorations(&self) -> Vec<&Decoration> {
        self.decorations
            .iter()
            .filter(|d| !self.presets.iter().any(|p| p.contains(&d.hash)))
            .collect()
    }

    pub fn is_selected(&self, item: &PickerItem) -> bool {
        match item {
            PickerItem::None => self.active().is_none(),
            PickerItem::Create { .. } => false,
            PickerItem::Decoration { decoration, .. } => {
                self.active().is_some_and(|d| d.hash == decoration.hash)
            }
        }
    }

    /// Own decorations first, framed by "none" and "create", then one section per preset
    pub fn sections(&self) -> Vec<PickerSection> {
        let blocked = self.decorations.iter().any(Decoration::is_pending_review);

        let mut own = vec![PickerItem::None];
        own.extend(self.own_decorations().into_iter().map(PickerItem::decoration));
        own.push(PickerItem::Create { blocked });

        let mut sections = vec![PickerSection {
            title: OWN_DECORATIONS_TITLE.to_string(),
            subtitle: None,
            key_prefix: OWN_DECORATIONS_PREFIX.to_string(),
            items: own,
        }];

        sections.extend(self.presets.iter().map(|preset| PickerSection {
            title: preset.name.clone(),
            subtitle: preset.description.clone().filter(|d| !d.is_empty()),
            key_prefix: format!("preset-{}", preset.id),
            items: preset
                .decorations
                .iter()
                .map(PickerItem::decoration)
                .collect(),
        }));

        sections
    }
}
