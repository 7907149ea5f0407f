use crate::domain::models::{LiveUser, UserId};

/// Registry of the users the host currently holds in memory
///
/// The decoration caches never own users; they only patch the decoration of a
/// user the host already knows about.
pub trait UserRegistry: Send + Sync {
    /// Look up a user by id
    fn get_user(&self, id: &UserId) -> Option<LiveUser>;

    /// The signed-in user, if any
    fn current_user(&self) -> Option<LiveUser>;

    /// Insert or replace a user
    fn upsert_user(&self, user: LiveUser);
}
