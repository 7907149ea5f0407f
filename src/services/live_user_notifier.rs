//! Pushes resolved decorations into the host's live users.

use std::sync::Arc;
use tracing::trace;

use crate::domain::errors::DecorResult;
use crate::domain::models::{AvatarDecoration, DecorationId, LiveUser, UserId};
use crate::domain::ports::{DecorationListener, UserRegistry};
use crate::services::event_bus::{EventBus, EventPayload};

/// Updates a user held by the [`UserRegistry`] and announces it with `USER_UPDATE`
///
/// Users the host does not hold are skipped; there is nothing to redraw for them.
pub struct LiveUserNotifier {
    registry: Arc<dyn UserRegistry>,
    bus: Arc<EventBus>,
}

impl LiveUserNotifier {
    pub fn new(registry: Arc<dyn UserRegistry>, bus: Arc<EventBus>) -> Self {
        Self { registry, bus }
    }

    /// Replace the avatar decoration of a live user, if the host holds one
    pub fn apply(&self, user_id: &UserId, decoration: Option<AvatarDecoration>) -> Option<LiveUser> {
        let Some(mut user) = self.registry.get_user(user_id) else {
            trace!(%user_id, "No live user to update");
            return None;
        };

        user.avatar_decoration = decoration;
        self.registry.upsert_user(user.clone());
        self.bus.publish(EventPayload::UserUpdate { user: user.clone() });
        Some(user)
    }
}

impl DecorationListener for LiveUserNotifier {
    fn decoration_resolved(&self, user_id: &UserId, decoration: &DecorationId) -> DecorResult<()> {
        self.apply(user_id, Some(AvatarDecoration::from_asset(decoration.clone())));
        Ok(())
    }
}
