use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::DecorResult;
use crate::domain::models::{Decoration, DecorationId, NewDecoration, Preset, UserId};

/// Result of a bulk lookup: one entry per user the service could resolve
///
/// A `None` value means the service knows the user has no decoration. Users the
/// service could not resolve are omitted entirely.
pub type UsersDecorations = HashMap<UserId, Option<DecorationId>>;

/// Bulk per-user decoration lookup
///
/// This is the single backend collaborator of the batched users cache. One call
/// covers every id queued during a debounce window.
#[async_trait]
pub trait UsersDecorationsLookup: Send + Sync {
    /// Resolve the decorations of `ids` in a single round-trip
    async fn users_decorations(&self, ids: &[UserId]) -> DecorResult<UsersDecorations>;
}

/// Current-user operations and the public preset catalog
#[async_trait]
pub trait DecorApi: Send + Sync {
    /// Decorations owned by the authenticated user
    async fn user_decorations(&self) -> DecorResult<Vec<Decoration>>;

    /// Decoration currently applied to the authenticated user
    async fn user_decoration(&self) -> DecorResult<Option<Decoration>>;

    /// Apply `decoration` to the authenticated user, or remove the current one
    async fn set_user_decoration(&self, decoration: Option<&Decoration>) -> DecorResult<()>;

    /// Upload a new decoration; it starts out pending review
    async fn create_decoration(&self, decoration: &NewDecoration) -> DecorResult<Decoration>;

    /// Delete one of the authenticated user's decorations
    async fn delete_decoration(&self, hash: &str) -> DecorResult<()>;

    /// Curated preset collections
    async fn presets(&self) -> DecorResult<Vec<Preset>>;
}
