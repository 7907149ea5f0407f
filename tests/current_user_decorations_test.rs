//! Integration tests for the signed-in user's decoration store

mod common;

use common::{asset, cache_config, decoration, png_bytes, uid, MockDecorApi, MockLookup};
use decor::adapters::memory::InMemoryUserRegistry;
use decor::domain::models::{DecorationFile, LiveUser, NewDecoration};
use decor::domain::ports::{NoopListener, UserRegistry};
use decor::services::{EventBus, EventPayload};
use decor::{CurrentUserDecorationsStore, DecorError, UsersDecorationsStore};
use std::sync::Arc;

struct Harness {
    api: Arc<MockDecorApi>,
    users: UsersDecorationsStore,
    registry: Arc<InMemoryUserRegistry>,
    bus: Arc<EventBus>,
    store: CurrentUserDecorationsStore,
}

fn harness(api: Arc<MockDecorApi>) -> Harness {
    let users = UsersDecorationsStore::new(
        Arc::new(MockLookup::default()),
        Arc::new(NoopListener),
        &cache_config(),
    );
    let registry = Arc::new(InMemoryUserRegistry::with_current_user(LiveUser::new("me", "wumpus")));
    let bus = Arc::new(EventBus::default());
    let store = CurrentUserDecorationsStore::new(
        api.clone(),
        users.clone(),
        registry.clone(),
        bus.clone(),
    );

    Harness {
        api,
        users,
        registry,
        bus,
        store,
    }
}

fn upload(alt: &str) -> NewDecoration {
    NewDecoration::new(alt, DecorationFile::new("cube.png", png_bytes(64)))
}

#[tokio::test]
async fn test_fetch_loads_decorations_and_selection() {
    let cube = decoration("cube", Some(true));
    let h = harness(MockDecorApi::with_decorations(
        vec![cube.clone(), decoration("star", Some(true))],
        Some(cube.clone()),
    ));

    h.store.fetch().await.unwrap();

    assert_eq!(h.store.decorations().len(), 2);
    assert_eq!(h.store.selected(), Some(cube));
    assert!(!h.store.has_pending_review());
}

#[tokio::test]
async fn test_select_updates_cache_and_live_user() {
    let star = decoration("star", Some(true));
    let h = harness(MockDecorApi::with_decorations(vec![star.clone()], None));
    let mut events = h.bus.subscribe();
    h.store.fetch().await.unwrap();

    h.store.select(Some(star.clone())).await.unwrap();

    assert_eq!(h.api.select_calls(), vec![Some("star".to_string())]);
    assert_eq!(h.store.selected(), Some(star));
    assert_eq!(h.users.get(&uid("me")), Some(Some(asset("star"))));

    let me = h.registry.get_user(&uid("me")).unwrap();
    assert_eq!(me.avatar_decoration.unwrap().asset, asset("star"));

    let event = events.recv().await.unwrap();
    assert_eq!(event.payload.kind(), "USER_UPDATE");
}

#[tokio::test]
async fn test_selecting_current_decoration_is_a_no_op() {
    let star = decoration("star", Some(true));
    let h = harness(MockDecorApi::with_decorations(vec![star.clone()], Some(star.clone())));
    h.store.fetch().await.unwrap();

    h.store.select(Some(star)).await.unwrap();

    assert!(h.api.select_calls().is_empty());
    assert_eq!(h.bus.current_sequence(), 0);
}

#[tokio::test]
async fn test_pending_decoration_cannot_be_worn() {
    let pending = decoration("new", Some(false));
    let h = harness(MockDecorApi::with_decorations(vec![pending.clone()], None));
    h.store.fetch().await.unwrap();

    let err = h.store.select(Some(pending)).await.unwrap_err();

    assert!(matches!(err, DecorError::PendingReview));
    assert!(h.api.select_calls().is_empty());
    assert_eq!(h.store.selected(), None);
    assert!(!h.users.has(&uid("me")));
    assert_eq!(h.bus.current_sequence(), 0);
}

#[tokio::test]
async fn test_clearing_selection_caches_no_decoration() {
    let star = decoration("star", Some(true));
    let h = harness(MockDecorApi::with_decorations(vec![star.clone()], Some(star)));
    h.store.fetch().await.unwrap();

    h.store.select(None).await.unwrap();

    assert_eq!(h.api.select_calls(), vec![None]);
    assert_eq!(h.store.selected(), None);
    assert_eq!(h.users.get(&uid("me")), Some(None));
    assert!(h.registry.get_user(&uid("me")).unwrap().avatar_decoration.is_none());
}

#[tokio::test]
async fn test_create_appends_decoration_and_publishes() {
    let h = harness(MockDecorApi::with_decorations(vec![], None));
    let mut events = h.bus.subscribe();
    h.store.fetch().await.unwrap();

    let created = h.store.create(upload("Spinning cube")).await.unwrap();

    assert_eq!(created.alt.as_deref(), Some("Spinning cube"));
    assert!(created.is_pending_review());
    assert_eq!(h.store.decorations(), vec![created.clone()]);
    assert!(h.store.has_pending_review());

    match events.recv().await.unwrap().payload {
        EventPayload::DecorationCreated { decoration } => assert_eq!(decoration, created),
        other => panic!("Expected DECORATION_CREATED, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_blocked_while_review_pending() {
    let h = harness(MockDecorApi::with_decorations(vec![decoration("new", Some(false))], None));
    h.store.fetch().await.unwrap();

    let err = h.store.create(upload("Another")).await.unwrap_err();

    assert!(matches!(err, DecorError::PendingReview));
    assert!(h.api.create_calls().is_empty());
}

#[tokio::test]
async fn test_create_rejects_invalid_upload_locally() {
    let h = harness(MockDecorApi::with_decorations(vec![], None));

    let nameless = h.store.create(upload("  ")).await.unwrap_err();
    assert!(matches!(nameless, DecorError::InvalidDecoration(_)));

    let gif = NewDecoration::new("Cube", DecorationFile::new("cube.gif", png_bytes(64)));
    assert!(matches!(
        h.store.create(gif).await.unwrap_err(),
        DecorError::InvalidDecoration(_)
    ));

    let huge = NewDecoration::new("Cube", DecorationFile::new("cube.png", png_bytes(1024 * 1024 + 1)));
    assert!(matches!(
        h.store.create(huge).await.unwrap_err(),
        DecorError::InvalidDecoration(_)
    ));

    assert!(h.api.create_calls().is_empty());
}

#[tokio::test]
async fn test_deleting_worn_decoration_clears_selection() {
    let star = decoration("star", Some(true));
    let cube = decoration("cube", Some(true));
    let h = harness(MockDecorApi::with_decorations(
        vec![star.clone(), cube.clone()],
        Some(star.clone()),
    ));
    h.users.set(uid("me"), Some(asset("star")));
    h.store.fetch().await.unwrap();

    h.store.delete("star").await.unwrap();

    assert_eq!(h.store.decorations(), vec![cube]);
    assert_eq!(h.store.selected(), None);
    assert_eq!(h.users.get(&uid("me")), Some(None));
}

#[tokio::test]
async fn test_deleting_other_decoration_keeps_selection() {
    let star = decoration("star", Some(true));
    let h = harness(MockDecorApi::with_decorations(
        vec![star.clone(), decoration("cube", Some(true))],
        Some(star.clone()),
    ));
    let mut events = h.bus.subscribe();
    h.store.fetch().await.unwrap();

    h.store.delete("cube").await.unwrap();

    assert_eq!(h.store.selected(), Some(star));
    match events.recv().await.unwrap().payload {
        EventPayload::DecorationDeleted { hash } => assert_eq!(hash, "cube"),
        other => panic!("Expected DECORATION_DELETED, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_unknown_decoration_fails() {
    let h = harness(MockDecorApi::with_decorations(vec![], None));

    let err = h.store.delete("ghost").await.unwrap_err();
    assert!(matches!(err, DecorError::DecorationNotFound(hash) if hash == "ghost"));
}

#[tokio::test]
async fn test_clear_forgets_everything() {
    let star = decoration("star", Some(true));
    let h = harness(MockDecorApi::with_decorations(vec![star.clone()], Some(star)));
    h.store.fetch().await.unwrap();

    h.store.clear();

    assert!(h.store.decorations().is_empty());
    assert_eq!(h.store.selected(), None);
}
