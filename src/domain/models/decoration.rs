//! Decoration catalog models
//!
//! Wire shapes follow the decoration service JSON (camelCase fields).

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::user::{DecorationId, UserId};
use crate::domain::errors::{DecorError, DecorResult};

/// SKU attached to every decoration served by the service
pub const SKU_ID: &str = "100101099111114";

/// SKU used for local previews of a file that has not been uploaded yet
pub const RAW_SKU_ID: &str = "11497119";

/// Upload size limit for new decorations (1 MiB)
pub const MAX_DECORATION_FILE_BYTES: usize = 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 2] = ["png", "apng"];

/// A decoration owned by a user or part of a preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub hash: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    /// `Some(false)` while the decoration waits for moderator review
    #[serde(default)]
    pub reviewed: Option<bool>,
    #[serde(default)]
    pub preset_id: Option<String>,
}

impl Decoration {
    /// Asset string as it appears in bulk lookups and on live users
    pub fn asset(&self) -> DecorationId {
        if self.animated {
            DecorationId::new(format!("a_{}", self.hash))
        } else {
            DecorationId::new(self.hash.clone())
        }
    }

    /// Shape the host renders around an avatar
    pub fn to_avatar_decoration(&self) -> AvatarDecoration {
        AvatarDecoration::from_asset(self.asset())
    }

    pub fn is_pending_review(&self) -> bool {
        self.reviewed == Some(false)
    }

    /// Image URL on the decoration CDN
    pub fn cdn_url(&self, cdn_base: &str) -> String {
        format!("{}/{}.png", cdn_base.trim_end_matches('/'), self.hash)
    }
}

/// A curated collection of decorations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub decorations: Vec<Decoration>,
    #[serde(default)]
    pub author_ids: Vec<UserId>,
}

impl Preset {
    pub fn contains(&self, hash: &str) -> bool {
        self.decorations.iter().any(|d| d.hash == hash)
    }
}

/// Avatar decoration attribute carried by a live user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarDecoration {
    pub asset: DecorationId,
    pub sku_id: String,
}

impl AvatarDecoration {
    pub fn from_asset(asset: DecorationId) -> Self {
        Self {
            asset,
            sku_id: SKU_ID.to_string(),
        }
    }
}

/// Image file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DecorationFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "decoration.png".to_string());
        Ok(Self { name, bytes })
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// MIME type used for the multipart upload
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("apng") => "image/apng",
            _ => "image/png",
        }
    }
}

/// Request to create a decoration for the current user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDecoration {
    /// Name used when referring to the decoration
    pub alt: String,
    pub file: DecorationFile,
}

impl NewDecoration {
    pub fn new(alt: impl Into<String>, file: DecorationFile) -> Self {
        Self {
            alt: alt.into(),
            file,
        }
    }

    /// Check the upload constraints: a name, a PNG/APNG file, at most 1 MiB
    pub fn validate(&self) -> DecorResult<()> {
        if self.alt.trim().is_empty() {
            return Err(DecorError::InvalidDecoration(
                "decoration name cannot be empty".to_string(),
            ));
        }

        match self.file.extension() {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                return Err(DecorError::InvalidDecoration(format!(
                    "file '{}' must be a PNG or APNG",
                    self.file.name
                )))
            }
        }

        if self.file.bytes.is_empty() {
            return Err(DecorError::InvalidDecoration(format!(
                "file '{}' is empty",
                self.file.name
            )));
        }

        if self.file.bytes.len() > MAX_DECORATION_FILE_BYTES {
            return Err(DecorError::InvalidDecoration(format!(
                "file '{}' is {} bytes, the limit is {} bytes",
                self.file.name,
                self.file.bytes.len(),
                MAX_DECORATION_FILE_BYTES
            )));
        }

        Ok(())
    }
}
