//! Batched per-user decoration cache.
//!
//! Lookups for users that are not cached yet go into a pending queue. Every
//! `fetch`/`fetch_many` re-arms a single debounce timer; when it finally fires the
//! queue is drained atomically and sent as one bulk lookup. Results are merged
//! into the cache and pushed to a [`DecorationListener`].
//!
//! Per user: `absent -> queued -> in flight -> resolved(Some | None)`. A resolved
//! entry only changes again through [`UsersDecorationsStore::set`] or a forced
//! fetch. A failed or timed out lookup leaves its ids absent so the next fetch
//! retries them.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{DecorError, DecorResult};
use crate::domain::models::{CacheConfig, DecorationId, UserId};
use crate::domain::ports::{DecorationListener, UsersDecorations, UsersDecorationsLookup};

/// How a bulk lookup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// The service answered and the cache was updated
    Resolved,
    /// The lookup returned an error; its ids stay absent
    Failed,
    /// The lookup exceeded the configured timeout; its ids stay absent
    TimedOut,
}

/// Summary of one finished bulk lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Monotonic batch number, starting at 1
    pub sequence: u64,
    /// Ids drained from the queue for this batch
    pub requested: Vec<UserId>,
    /// Number of entries returned by the service
    pub resolved: usize,
    /// How the lookup ended
    pub outcome: BatchOutcome,
    /// Failure reason for `Failed` and `TimedOut`
    pub error: Option<String>,
}

/// Last failed lookup of an id that has not been queued again since
#[derive(Debug, Clone)]
struct LookupFailure {
    outcome: BatchOutcome,
    error: String,
}

#[derive(Default)]
struct StoreState {
    decorations: HashMap<UserId, Option<DecorationId>>,
    queue: HashSet<UserId>,
    failures: HashMap<UserId, LookupFailure>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every re-arm so a timer that already woke up cannot fire for a stale arm
    arm: u64,
}

struct StoreInner {
    state: Mutex<StoreState>,
    lookup: Arc<dyn UsersDecorationsLookup>,
    listener: Arc<dyn DecorationListener>,
    debounce: Duration,
    lookup_timeout: Duration,
    batch_sequence: AtomicU64,
    batches: watch::Sender<Option<BatchReport>>,
}

/// Shared cache of user decorations with coalesced bulk fetching
///
/// Cloning is cheap and every clone refers to the same cache. Create one per
/// process and hand it to consumers.
#[derive(Clone)]
pub struct UsersDecorationsStore {
    inner: Arc<StoreInner>,
}

impl UsersDecorationsStore {
    /// Create an empty cache resolving ids through `lookup`
    pub fn new(
        lookup: Arc<dyn UsersDecorationsLookup>,
        listener: Arc<dyn DecorationListener>,
        config: &CacheConfig,
    ) -> Self {
        let (batches, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState::default()),
                lookup,
                listener,
                debounce: Duration::from_millis(config.debounce_ms),
                lookup_timeout: Duration::from_secs(config.lookup_timeout_secs),
                batch_sequence: AtomicU64::new(0),
                batches,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value for `id` without fetching
    ///
    /// `None` when the user was never resolved, `Some(None)` when the user is
    /// known to have no decoration.
    pub fn get(&self, id: &UserId) -> Option<Option<DecorationId>> {
        self.lock_state().decorations.get(id).cloned()
    }

    /// Whether `id` has a cache entry, including the "no decoration" case
    pub fn has(&self, id: &UserId) -> bool {
        self.lock_state().decorations.contains_key(id)
    }

    /// Overwrite the entry for `id` with an authoritative value
    pub fn set(&self, id: UserId, decoration: Option<DecorationId>) {
        debug!(user_id = %id, ?decoration, "Setting user decoration");
        let mut state = self.lock_state();
        state.failures.remove(&id);
        state.decorations.insert(id, decoration);
    }

    /// Make sure `id` gets resolved by an upcoming bulk lookup
    ///
    /// No-op when `id` is already cached unless `force` is set. Never blocks; the
    /// cache is updated once the batch completes. Must be called from within a
    /// tokio runtime.
    pub fn fetch(&self, id: UserId, force: bool) {
        let mut state = self.lock_state();
        if !force && state.decorations.contains_key(&id) {
            return;
        }

        state.failures.remove(&id);
        state.queue.insert(id);
        self.arm_timer(&mut state);
    }

    /// Queue every id in `ids` that is not cached yet and arm the timer once
    pub fn fetch_many<I>(&self, ids: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut state = self.lock_state();
        let before = state.queue.len();
        let mut requested = false;

        for id in ids {
            requested = true;
            if !state.decorations.contains_key(&id) {
                state.failures.remove(&id);
                state.queue.insert(id);
            }
        }

        // Nothing new to look up: an empty request, or ids that were all cached or already queued
        if !requested || state.queue.len() == before {
            return;
        }

        self.arm_timer(&mut state);
    }

    /// Ids waiting for the next bulk lookup
    pub fn pending(&self) -> Vec<UserId> {
        let mut pending: Vec<_> = self.lock_state().queue.iter().cloned().collect();
        pending.sort();
        pending
    }

    /// Number of cache entries
    pub fn len(&self) -> usize {
        self.lock_state().decorations.len()
    }

    /// Whether nothing is cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports of finished bulk lookups; holds the most recent one
    pub fn batches(&self) -> watch::Receiver<Option<BatchReport>> {
        self.inner.batches.subscribe()
    }

    /// Fetch `ids` and wait until every one of them is cached
    ///
    /// Returns the cached values, or the error of a bulk lookup that covered any
    /// of the ids.
    pub async fn resolve_many(
        &self,
        ids: &[UserId],
    ) -> DecorResult<HashMap<UserId, Option<DecorationId>>> {
        let mut batches = self.batches();
        batches.mark_unchanged();

        self.fetch_many(ids.iter().cloned());

        loop {
            if let Some(settled) = self.settled(ids) {
                return settled;
            }
            // Failures land in the state before their report is published
            if batches.changed().await.is_err() {
                break;
            }
        }

        let state = self.lock_state();
        Ok(Self::cached(&state, ids))
    }

    /// Outcome for `ids` once every one is cached or one of them failed
    fn settled(
        &self,
        ids: &[UserId],
    ) -> Option<DecorResult<HashMap<UserId, Option<DecorationId>>>> {
        let state = self.lock_state();
        if let Some(failure) = ids.iter().find_map(|id| state.failures.get(id)) {
            return Some(Err(match failure.outcome {
                BatchOutcome::TimedOut => {
                    DecorError::LookupTimedOut(self.inner.lookup_timeout.as_secs())
                }
                BatchOutcome::Resolved | BatchOutcome::Failed => {
                    DecorError::LookupFailed(failure.error.clone())
                }
            }));
        }

        ids.iter()
            .all(|id| state.decorations.contains_key(id))
            .then(|| Ok(Self::cached(&state, ids)))
    }

    fn cached(state: &StoreState, ids: &[UserId]) -> HashMap<UserId, Option<DecorationId>> {
        ids.iter()
            .filter_map(|id| {
                state
                    .decorations
                    .get(id)
                    .map(|decoration| (id.clone(), decoration.clone()))
            })
            .collect()
    }

    /// Re-arm the debounce timer, superseding any timer that has not fired yet
    fn arm_timer(&self, state: &mut StoreState) {
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        state.arm = state.arm.wrapping_add(1);
        let arm = state.arm;
        let store = self.clone();

        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(store.inner.debounce).await;
            store.bulk_fetch(arm).await;
        }));
    }

    async fn bulk_fetch(&self, arm: u64) {
        let requested: Vec<UserId> = {
            let mut state = self.lock_state();
            if state.arm != arm {
                return;
            }
            // From here on the batch owns its ids; later enqueues arm a fresh timer
            state.timer = None;
            state.queue.drain().collect()
        };

        if requested.is_empty() {
            return;
        }

        let sequence = self.inner.batch_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let report = self.run_batch(sequence, requested).await;
        self.inner.batches.send_replace(Some(report));
    }

    #[instrument(skip(self, requested), fields(size = requested.len()))]
    async fn run_batch(&self, sequence: u64, requested: Vec<UserId>) -> BatchReport {
        debug!("Sending bulk decoration lookup");

        let lookup = self.inner.lookup.users_decorations(&requested);
        let (resolved, outcome, error) =
            match tokio::time::timeout(self.inner.lookup_timeout, lookup).await {
                Ok(Ok(fetched)) => (self.merge(&requested, fetched), BatchOutcome::Resolved, None),
                Ok(Err(err)) => {
                    warn!(error = %err, "Bulk decoration lookup failed, ids left for retry");
                    (0, BatchOutcome::Failed, Some(err.to_string()))
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.inner.lookup_timeout.as_secs(),
                        "Bulk decoration lookup timed out, ids left for retry"
                    );
                    (
                        0,
                        BatchOutcome::TimedOut,
                        Some(format!(
                            "timed out after {}s",
                            self.inner.lookup_timeout.as_secs()
                        )),
                    )
                }
            };

        if let Some(ref error) = error {
            self.record_failure(&requested, outcome, error);
        }

        BatchReport {
            sequence,
            requested,
            resolved,
            outcome,
            error,
        }
    }

    /// Remember the failure for ids that were neither resolved nor queued again meanwhile
    fn record_failure(&self, requested: &[UserId], outcome: BatchOutcome, error: &str) {
        let mut state = self.lock_state();
        for user_id in requested {
            if state.decorations.contains_key(user_id) || state.queue.contains(user_id) {
                continue;
            }
            state.failures.insert(
                user_id.clone(),
                LookupFailure {
                    outcome,
                    error: error.to_string(),
                },
            );
        }
    }

    /// Commit a lookup response, then notify the listener outside the lock
    fn merge(&self, requested: &[UserId], fetched: UsersDecorations) -> usize {
        let returned = fetched.len();
        let mut decorated = Vec::new();

        {
            let mut state = self.lock_state();
            for (user_id, decoration) in fetched {
                if let Some(ref asset) = decoration {
                    decorated.push((user_id.clone(), asset.clone()));
                }
                state.decorations.insert(user_id, decoration);
            }

            for user_id in requested {
                state.failures.remove(user_id);
                state.decorations.entry(user_id.clone()).or_insert(None);
            }
        }

        debug!(returned, decorated = decorated.len(), "Merged bulk decoration lookup");

        for (user_id, asset) in &decorated {
            if let Err(err) = self.inner.listener.decoration_resolved(user_id, asset) {
                debug!(%user_id, error = %err, "Ignoring failed decoration notification");
            }
        }

        returned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    use crate::domain::ports::NoopListener;

    #[derive(Default)]
    struct RecordingLookup {
        calls: StdMutex<Vec<Vec<UserId>>>,
        response: UsersDecorations,
        delay: Option<Duration>,
        fail: bool,
    }

    impl RecordingLookup {
        fn calls(&self) -> Vec<Vec<UserId>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UsersDecorationsLookup for RecordingLookup {
        async fn users_decorations(&self, ids: &[UserId]) -> DecorResult<UsersDecorations> {
            let mut sorted = ids.to_vec();
            sorted.sort();
            self.calls.lock().unwrap().push(sorted);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(DecorError::LookupFailed("service unavailable".to_string()));
            }

            Ok(self
                .response
                .iter()
                .filter(|(id, _)| ids.contains(id))
                .map(|(id, deco)| (id.clone(), deco.clone()))
                .collect())
        }
    }

    fn uid(id: &str) -> UserId {
        UserId::from(id)
    }

    fn store_with(lookup: Arc<RecordingLookup>) -> UsersDecorationsStore {
        UsersDecorationsStore::new(lookup, Arc::new(NoopListener), &CacheConfig::default())
    }

    async fn next_batch(rx: &mut watch::Receiver<Option<BatchReport>>) -> BatchReport {
        rx.changed().await.unwrap();
        rx.borrow_and_update().clone().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_in_one_window_share_one_lookup() {
        let lookup = Arc::new(RecordingLookup::default());
        let store = store_with(lookup.clone());
        let mut rx = store.batches();

        store.fetch(uid("a"), false);
        store.fetch(uid("b"), false);
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.fetch(uid("a"), false);

        let report = next_batch(&mut rx).await;
        assert_eq!(report.sequence, 1);
        assert_eq!(lookup.calls(), vec![vec![uid("a"), uid("b")]]);
        assert!(store.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_re_arming_delays_the_lookup() {
        let lookup = Arc::new(RecordingLookup::default());
        let store = store_with(lookup.clone());

        store.fetch(uid("a"), false);
        tokio::time::sleep(Duration::from_millis(200)).await;
        store.fetch(uid("b"), false);
        tokio::time::sleep(Duration::from_millis(200)).await;

        // 400ms after the first fetch but only 200ms after the last one
        assert!(lookup.calls().is_empty());
        assert_eq!(store.pending(), vec![uid("a"), uid("b")]);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_ids_are_cached_as_none() {
        let lookup = Arc::new(RecordingLookup {
            response: HashMap::from([(uid("a"), Some(DecorationId::from("x")))]),
            ..Default::default()
        });
        let store = store_with(lookup);
        let mut rx = store.batches();

        store.fetch_many(vec![uid("a"), uid("b"), uid("c")]);
        let report = next_batch(&mut rx).await;

        assert_eq!(report.outcome, BatchOutcome::Resolved);
        assert_eq!(report.resolved, 1);
        assert_eq!(store.get(&uid("a")), Some(Some(DecorationId::from("x"))));
        assert_eq!(store.get(&uid("b")), Some(None));
        assert_eq!(store.get(&uid("c")), Some(None));
        assert!(store.has(&uid("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_ids_are_not_fetched_again() {
        let lookup = Arc::new(RecordingLookup::default());
        let store = store_with(lookup.clone());

        store.set(uid("a"), None);
        store.fetch(uid("a"), false);
        store.fetch_many(vec![uid("a")]);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(store.pending().is_empty());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_fetch_always_enqueues() {
        let lookup = Arc::new(RecordingLookup {
            response: HashMap::from([(uid("a"), Some(DecorationId::from("new")))]),
            ..Default::default()
        });
        let store = store_with(lookup.clone());
        let mut rx = store.batches();

        store.set(uid("a"), Some(DecorationId::from("old")));
        store.fetch(uid("a"), true);
        assert_eq!(store.pending(), vec![uid("a")]);

        next_batch(&mut rx).await;
        assert_eq!(store.get(&uid("a")), Some(Some(DecorationId::from("new"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_fetch_many_is_a_no_op() {
        let lookup = Arc::new(RecordingLookup::default());
        let store = store_with(lookup.clone());

        store.fetch_many(Vec::new());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(store.is_empty());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_queued_during_flight_go_into_next_batch() {
        let lookup = Arc::new(RecordingLookup {
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        });
        let store = store_with(lookup.clone());
        let mut rx = store.batches();

        store.fetch(uid("a"), false);
        tokio::time::sleep(Duration::from_millis(350)).await;
        // First batch is now in flight
        store.fetch(uid("b"), false);

        let first = next_batch(&mut rx).await;
        let second = next_batch(&mut rx).await;

        assert_eq!(first.requested, vec![uid("a")]);
        assert_eq!(second.requested, vec![uid("b")]);
        assert_eq!(lookup.calls(), vec![vec![uid("a")], vec![uid("b")]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_leaves_ids_retryable() {
        let lookup = Arc::new(RecordingLookup {
            fail: true,
            ..Default::default()
        });
        let store = store_with(lookup.clone());
        let mut rx = store.batches();

        store.fetch(uid("a"), false);
        let report = next_batch(&mut rx).await;

        assert_eq!(report.outcome, BatchOutcome::Failed);
        assert!(report.error.is_some());
        assert!(!store.has(&uid("a")));

        store.fetch(uid("a"), false);
        next_batch(&mut rx).await;
        assert_eq!(lookup.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_lookup_times_out() {
        let lookup = Arc::new(RecordingLookup {
            delay: Some(Duration::from_secs(600)),
            ..Default::default()
        });
        let store = store_with(lookup);
        let mut rx = store.batches();

        store.fetch(uid("a"), false);
        let report = next_batch(&mut rx).await;

        assert_eq!(report.outcome, BatchOutcome::TimedOut);
        assert!(!store.has(&uid("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_during_flight_is_not_demoted() {
        let lookup = Arc::new(RecordingLookup {
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        });
        let store = store_with(lookup);
        let mut rx = store.batches();

        store.fetch(uid("a"), false);
        tokio::time::sleep(Duration::from_millis(500)).await;
        store.set(uid("a"), Some(DecorationId::from("mine")));
        assert_eq!(store.get(&uid("a")), Some(Some(DecorationId::from("mine"))));

        next_batch(&mut rx).await;
        assert_eq!(store.get(&uid("a")), Some(Some(DecorationId::from("mine"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_waits_for_the_batch() {
        let lookup = Arc::new(RecordingLookup {
            response: HashMap::from([(uid("u1"), Some(DecorationId::from("deco1")))]),
            ..Default::default()
        });
        let store = store_with(lookup);

        let resolved = store.resolve_many(&[uid("u1"), uid("u2")]).await.unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&uid("u1")], Some(DecorationId::from("deco1")));
        assert_eq!(resolved[&uid("u2")], None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_surfaces_lookup_failure() {
        let lookup = Arc::new(RecordingLookup {
            fail: true,
            ..Default::default()
        });
        let store = store_with(lookup);

        let err = store.resolve_many(&[uid("u1")]).await.unwrap_err();
        assert!(matches!(err, DecorError::LookupFailed(_)));
    }
}
