use serde::{Deserialize, Serialize};
use std::fmt;

use super::decoration::AvatarDecoration;

/// Opaque identifier of a user (a Discord snowflake in practice)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque identifier of a decoration asset as returned by the bulk lookup
///
/// Animated assets carry an `a_` prefix in front of the decoration hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecorationId(String);

impl DecorationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the asset refers to an animated decoration
    pub fn is_animated(&self) -> bool {
        self.0.starts_with("a_")
    }

    /// Decoration hash with any animation prefix removed
    pub fn hash(&self) -> &str {
        self.0.strip_prefix("a_").unwrap_or(&self.0)
    }
}

impl fmt::Display for DecorationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DecorationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DecorationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// In-memory representation of a user held by the host, independent of the decoration cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveUser {
    pub id: UserId,
    pub username: String,
    /// Decoration currently rendered around the avatar
    #[serde(default)]
    pub avatar_decoration: Option<AvatarDecoration>,
}

impl LiveUser {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            avatar_decoration: None,
        }
    }
}
