//! Decorations owned and worn by the signed-in user.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, instrument};

use crate::domain::errors::{DecorError, DecorResult};
use crate::domain::models::{Decoration, NewDecoration};
use crate::domain::ports::{DecorApi, UserRegistry};
use crate::services::event_bus::{EventBus, EventPayload};
use crate::services::live_user_notifier::LiveUserNotifier;
use crate::services::users_decorations::UsersDecorationsStore;

#[derive(Debug, Default)]
struct CurrentUserState {
    decorations: Vec<Decoration>,
    selected: Option<Decoration>,
}

/// Store for the signed-in user's decorations and current selection
///
/// Selecting a decoration also writes the user's entry in the shared
/// [`UsersDecorationsStore`] and redraws the live user, so the change shows up
/// without waiting for a lookup.
pub struct CurrentUserDecorationsStore {
    api: Arc<dyn DecorApi>,
    users: UsersDecorationsStore,
    registry: Arc<dyn UserRegistry>,
    bus: Arc<EventBus>,
    notifier: LiveUserNotifier,
    state: RwLock<CurrentUserState>,
}

impl CurrentUserDecorationsStore {
    pub fn new(
        api: Arc<dyn DecorApi>,
        users: UsersDecorationsStore,
        registry: Arc<dyn UserRegistry>,
        bus: Arc<EventBus>,
    ) -> Self {
        let notifier = LiveUserNotifier::new(registry.clone(), bus.clone());
        Self {
            api,
            users,
            registry,
            bus,
            notifier,
            state: RwLock::new(CurrentUserState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CurrentUserState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CurrentUserState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn decorations(&self) -> Vec<Decoration> {
        self.read().decorations.clone()
    }

    pub fn selected(&self) -> Option<Decoration> {
        self.read().selected.clone()
    }

    /// A new decoration cannot be created while another one awaits review
    pub fn has_pending_review(&self) -> bool {
        self.read().decorations.iter().any(Decoration::is_pending_review)
    }

    /// Load the user's decorations and current selection from the service
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> DecorResult<()> {
        let (decorations, selected) =
            tokio::try_join!(self.api.user_decorations(), self.api.user_decoration())?;

        info!(count = decorations.len(), selected = ?selected.as_ref().map(|d| &d.hash), "Loaded user decorations");

        let mut state = self.write();
        state.decorations = decorations;
        state.selected = selected;
        Ok(())
    }

    /// Upload a new decoration after validating it locally
    #[instrument(skip(self, decoration), fields(alt = %decoration.alt, file = %decoration.file.name))]
    pub async fn create(&self, decoration: NewDecoration) -> DecorResult<Decoration> {
        decoration.validate()?;
        if self.has_pending_review() {
            return Err(DecorError::PendingReview);
        }

        let created = self.api.create_decoration(&decoration).await?;
        info!(hash = %created.hash, "Created decoration");

        self.write().decorations.push(created.clone());
        self.bus.publish(EventPayload::DecorationCreated {
            decoration: created.clone(),
        });
        Ok(created)
    }

    /// Delete one of the user's decorations, dropping the selection if it was worn
    #[instrument(skip(self))]
    pub async fn delete(&self, hash: &str) -> DecorResult<()> {
        self.api.delete_decoration(hash).await?;
        info!("Deleted decoration");

        let was_selected = {
            let mut state = self.write();
            state.decorations.retain(|d| d.hash != hash);
            let was_selected = state.selected.as_ref().is_some_and(|d| d.hash == hash);
            if was_selected {
                state.selected = None;
            }
            was_selected
        };

        if was_selected {
            self.apply_to_current_user(None);
        }
        self.bus.publish(EventPayload::DecorationDeleted {
            hash: hash.to_string(),
        });
        Ok(())
    }

    /// Wear `decoration`, or no decoration for `None`
    ///
    /// Decorations pending review cannot be worn.
    #[instrument(skip(self, decoration), fields(hash = ?decoration.as_ref().map(|d| &d.hash)))]
    pub async fn select(&self, decoration: Option<Decoration>) -> DecorResult<()> {
        if decoration.as_ref().is_some_and(Decoration::is_pending_review) {
            return Err(DecorError::PendingReview);
        }

        let current = self.read().selected.as_ref().map(|d| d.hash.clone());
        if current == decoration.as_ref().map(|d| d.hash.clone()) {
            return Ok(());
        }

        self.api.set_user_decoration(decoration.as_ref()).await?;
        info!("Selected decoration");

        self.write().selected.clone_from(&decoration);
        self.apply_to_current_user(decoration.as_ref());
        Ok(())
    }

    /// Forget everything, e.g. on sign-out
    pub fn clear(&self) {
        let mut state = self.write();
        state.decorations.clear();
        state.selected = None;
    }

    fn apply_to_current_user(&self, decoration: Option<&Decoration>) {
        let Some(user) = self.registry.current_user() else {
            return;
        };

        self.users
            .set(user.id.clone(), decoration.map(Decoration::asset));
        self.notifier
            .apply(&user.id, decoration.map(Decoration::to_avatar_decoration));
    }
}
