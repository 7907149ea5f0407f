//! Common test utilities for integration tests
//!
//! Provides in-memory doubles for the decoration service ports and shared
//! fixtures used across multiple integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use decor::domain::models::{CacheConfig, Decoration, NewDecoration, Preset};
use decor::domain::ports::{DecorApi, DecorationListener, UsersDecorations, UsersDecorationsLookup};
use decor::{DecorError, DecorResult, DecorationId, UserId};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn uid(id: &str) -> UserId {
    UserId::from(id)
}

pub fn asset(id: &str) -> DecorationId {
    DecorationId::from(id)
}

/// Cache settings used by the store tests: default debounce, short timeout
pub fn cache_config() -> CacheConfig {
    CacheConfig {
        debounce_ms: 300,
        lookup_timeout_secs: 5,
    }
}

pub fn decoration(hash: &str, reviewed: Option<bool>) -> Decoration {
    Decoration {
        hash: hash.to_string(),
        animated: false,
        alt: Some(format!("{hash} decoration")),
        author_id: Some("42".to_string()),
        reviewed,
        preset_id: None,
    }
}

pub fn preset(id: &str, hashes: &[&str]) -> Preset {
    Preset {
        id: id.to_string(),
        name: format!("Preset {id}"),
        description: None,
        decorations: hashes
            .iter()
            .map(|hash| Decoration {
                preset_id: Some(id.to_string()),
                ..decoration(hash, Some(true))
            })
            .collect(),
        author_ids: vec![uid("42")],
    }
}

/// Bulk lookup double that records every call
#[derive(Default)]
pub struct MockLookup {
    calls: Mutex<Vec<Vec<UserId>>>,
    response: Mutex<UsersDecorations>,
    fail: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MockLookup {
    pub fn with_response(entries: &[(&str, Option<&str>)]) -> Self {
        let lookup = Self::default();
        lookup.set_response(entries);
        lookup
    }

    pub fn set_response(&self, entries: &[(&str, Option<&str>)]) {
        *self.response.lock().unwrap() = entries
            .iter()
            .map(|(id, deco)| (uid(id), deco.map(asset)))
            .collect();
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Recorded calls, each sorted for stable comparison
    pub fn calls(&self) -> Vec<Vec<UserId>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsersDecorationsLookup for MockLookup {
    async fn users_decorations(&self, ids: &[UserId]) -> DecorResult<UsersDecorations> {
        let mut sorted = ids.to_vec();
        sorted.sort();
        self.calls.lock().unwrap().push(sorted);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DecorError::Api("503 Service Unavailable".to_string()));
        }

        let response = self.response.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| response.get(id).map(|deco| (id.clone(), deco.clone())))
            .collect())
    }
}

/// Listener double counting notifications, optionally failing each one
#[derive(Default)]
pub struct CountingListener {
    notifications: Mutex<Vec<(UserId, DecorationId)>>,
    fail: bool,
}

impl CountingListener {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> Vec<(UserId, DecorationId)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn count_for(&self, id: &str) -> usize {
        self.notifications()
            .iter()
            .filter(|(user_id, _)| user_id.as_str() == id)
            .count()
    }
}

impl DecorationListener for CountingListener {
    fn decoration_resolved(&self, user_id: &UserId, decoration: &DecorationId) -> DecorResult<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((user_id.clone(), decoration.clone()));

        if self.fail {
            return Err(DecorError::NotificationFailed {
                user_id: user_id.clone(),
                reason: "renderer gone".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory decoration service for the signed-in user
#[derive(Default)]
pub struct MockDecorApi {
    pub decorations: Mutex<Vec<Decoration>>,
    pub selected: Mutex<Option<Decoration>>,
    pub presets: Mutex<Vec<Preset>>,
    /// Hash argument of every select call; `None` clears the selection
    pub select_calls: Mutex<Vec<Option<String>>>,
    pub create_calls: Mutex<Vec<String>>,
}

impl MockDecorApi {
    pub fn with_decorations(decorations: Vec<Decoration>, selected: Option<Decoration>) -> Arc<Self> {
        let api = Self::default();
        *api.decorations.lock().unwrap() = decorations;
        *api.selected.lock().unwrap() = selected;
        Arc::new(api)
    }

    pub fn select_calls(&self) -> Vec<Option<String>> {
        self.select_calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<String> {
        self.create_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecorApi for MockDecorApi {
    async fn user_decorations(&self) -> DecorResult<Vec<Decoration>> {
        Ok(self.decorations.lock().unwrap().clone())
    }

    async fn user_decoration(&self) -> DecorResult<Option<Decoration>> {
        Ok(self.selected.lock().unwrap().clone())
    }

    async fn set_user_decoration(&self, decoration: Option<&Decoration>) -> DecorResult<()> {
        self.select_calls
            .lock()
            .unwrap()
            .push(decoration.map(|d| d.hash.clone()));
        *self.selected.lock().unwrap() = decoration.cloned();
        Ok(())
    }

    async fn create_decoration(&self, decoration: &NewDecoration) -> DecorResult<Decoration> {
        self.create_calls.lock().unwrap().push(decoration.alt.clone());
        let created = Decoration {
            alt: Some(decoration.alt.clone()),
            ..decoration_for_upload(self.create_calls.lock().unwrap().len())
        };
        self.decorations.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_decoration(&self, hash: &str) -> DecorResult<()> {
        let mut decorations = self.decorations.lock().unwrap();
        let before = decorations.len();
        decorations.retain(|d| d.hash != hash);
        if decorations.len() == before {
            return Err(DecorError::DecorationNotFound(hash.to_string()));
        }
        Ok(())
    }

    async fn presets(&self) -> DecorResult<Vec<Preset>> {
        Ok(self.presets.lock().unwrap().clone())
    }
}

fn decoration_for_upload(n: usize) -> Decoration {
    decoration(&format!("upload{n}"), Some(false))
}

/// Minimal PNG signature followed by padding
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}
