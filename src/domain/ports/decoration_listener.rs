use crate::domain::errors::DecorResult;
use crate::domain::models::{DecorationId, UserId};

/// Hook invoked after a user's decoration resolves to a value
///
/// Calls are best effort. The cache has already committed the value when the
/// listener runs, and any error it returns is logged and dropped.
pub trait DecorationListener: Send + Sync {
    fn decoration_resolved(&self, user_id: &UserId, decoration: &DecorationId) -> DecorResult<()>;
}

/// Listener that does nothing, for callers with no host to update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl DecorationListener for NoopListener {
    fn decoration_resolved(&self, _user_id: &UserId, _decoration: &DecorationId) -> DecorResult<()> {
        Ok(())
    }
}
