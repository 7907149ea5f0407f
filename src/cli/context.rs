//! Wiring of the client, stores and event bus used by commands.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::memory::InMemoryUserRegistry;
use crate::domain::models::Config;
use crate::infrastructure::decor::{DecorClient, DecorClientConfig};
use crate::services::{
    CurrentUserDecorationsStore, EventBus, LiveUserNotifier, UsersDecorationsStore,
};

/// Everything a command needs, built once per invocation
pub struct AppContext {
    pub config: Config,
    pub client: Arc<DecorClient>,
    pub registry: Arc<InMemoryUserRegistry>,
    pub bus: Arc<EventBus>,
    pub users: UsersDecorationsStore,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let client = Arc::new(
            DecorClient::new(DecorClientConfig::from_config(&config))
                .context("Failed to create decoration client")?,
        );
        let registry = Arc::new(InMemoryUserRegistry::new());
        let bus = Arc::new(EventBus::default());
        let notifier = Arc::new(LiveUserNotifier::new(registry.clone(), bus.clone()));
        let users = UsersDecorationsStore::new(client.clone(), notifier, &config.cache);

        Ok(Self {
            config,
            client,
            registry,
            bus,
            users,
        })
    }

    /// Store for the signed-in user, sharing this context's user cache
    pub fn current_user_store(&self) -> CurrentUserDecorationsStore {
        CurrentUserDecorationsStore::new(
            self.client.clone(),
            self.users.clone(),
            self.registry.clone(),
            self.bus.clone(),
        )
    }
}
