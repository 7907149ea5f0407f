use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::models::{LiveUser, UserId};
use crate::domain::ports::UserRegistry;

/// `UserRegistry` backed by a map, with an optional signed-in user
#[derive(Default)]
pub struct InMemoryUserRegistry {
    users: RwLock<HashMap<UserId, LiveUser>>,
    current: RwLock<Option<UserId>>,
}

impl InMemoryUserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose signed-in user is `user`
    pub fn with_current_user(user: LiveUser) -> Self {
        let registry = Self::new();
        registry.set_current_user(user);
        registry
    }

    /// Insert `user` and mark it as the signed-in user
    pub fn set_current_user(&self, user: LiveUser) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user.id.clone());
        self.upsert_user(user);
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserRegistry for InMemoryUserRegistry {
    fn get_user(&self, id: &UserId) -> Option<LiveUser> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn current_user(&self) -> Option<LiveUser> {
        let current = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        self.get_user(&current)
    }

    fn upsert_user(&self, user: LiveUser) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id.clone(), user);
    }
}
