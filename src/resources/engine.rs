/// Resource cache engine
///
/// Keeps one slot per resource key holding:
/// - The cached entry (data, last error, loading flag, request token)
/// - The subscriber table (subscriber id → requested refresh interval)
/// - At most one polling task, at the minimum requested interval
/// - A watch channel that publishes a snapshot after every state change
///
/// Every request is stamped with a fresh token when it is issued and its
/// result is applied only if the token is still the entry's current one, so
/// an older response can never overwrite a newer request's result.
///
/// Slots outlive their subscribers: the last unsubscribe stops polling but
/// keeps the entry warm, so a quick re-subscribe renders cached data at once.
use super::fetcher::ResourceFetcher;
use super::types::{CacheEntry, CacheSnapshot};
use crate::arguments::is_debug_cache_enabled;
use crate::config::CacheConfig;
use crate::errors::{CacheError, FetchError};
use crate::logger::{self, LogTag};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Subscriber ID (unique per cache instance)
pub type SubscriberId = u64;

// ============================================================================
// KEY SLOTS
// ============================================================================

/// Periodic refresh task for one key; aborted when dropped
struct Poller {
    interval: Duration,
    handle: JoinHandle<()>,
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct KeySlot {
    entry: CacheEntry,
    /// Monotonic completion time of the last successful fetch (or injection)
    fetched_at: Option<Instant>,
    injected: bool,
    subscribers: HashMap<SubscriberId, Option<Duration>>,
    poller: Option<Poller>,
    notifier: watch::Sender<CacheSnapshot>,
}

impl KeySlot {
    fn new(key: &str) -> Self {
        let (notifier, _) = watch::channel(CacheSnapshot::empty(key));
        Self {
            entry: CacheEntry::new(key),
            fetched_at: None,
            injected: false,
            subscribers: HashMap::new(),
            poller: None,
            notifier,
        }
    }

    fn publish(&self) {
        self.notifier.send_replace(self.entry.snapshot(self.injected));
    }

    fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        self.fetched_at
            .map_or(false, |at| now.saturating_duration_since(at) < window)
    }

    /// Minimum interval requested by any subscriber
    fn effective_interval(&self) -> Option<Duration> {
        self.subscribers.values().flatten().min().copied()
    }

    fn poll_interval(&self) -> Option<Duration> {
        self.poller.as_ref().map(|p| p.interval)
    }

    /// Issue a new request token, superseding any request still in flight
    fn begin_request(&mut self) -> u64 {
        self.entry.request_token += 1;
        self.entry.is_loading = true;
        self.publish();
        self.entry.request_token
    }
}

// ============================================================================
// SHARED STATE
// ============================================================================

struct CacheShared {
    fetcher: Arc<dyn ResourceFetcher>,
    dedupe_interval: Duration,
    slots: Mutex<HashMap<String, KeySlot>>,
    next_subscriber: AtomicU64,
    /// Runtime the cache was created on; background work is spawned here so
    /// subscriptions can be dropped from any thread
    runtime: Handle,
}

impl CacheShared {
    /// Token for a scheduled refresh, or `None` when the tick should be skipped
    ///
    /// A request still in flight blocks the tick, so a hung request stalls
    /// polling for its key until a manual revalidation.
    fn begin_poll(&self, key: &str) -> Option<u64> {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(key)?;
        if slot.injected || slot.entry.is_loading || slot.subscribers.is_empty() {
            if is_debug_cache_enabled() {
                logger::debug(
                    LogTag::Cache,
                    &format!(
                        "{}: poll skipped (injected={}, loading={}, subscribers={})",
                        key,
                        slot.injected,
                        slot.entry.is_loading,
                        slot.subscribers.len()
                    ),
                );
            }
            return None;
        }
        Some(slot.begin_request())
    }

    /// Apply a finished request; returns false when the response was stale
    fn complete_request(&self, key: &str, token: u64, result: Result<Value, FetchError>) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };

        if token != slot.entry.request_token {
            logger::debug(
                LogTag::Cache,
                &format!(
                    "{}: discarding stale response (token={}, current={})",
                    key, token, slot.entry.request_token
                ),
            );
            return false;
        }

        slot.entry.is_loading = false;
        match result {
            Ok(value) => {
                slot.entry.data = Some(Arc::new(value));
                slot.entry.error = None;
                slot.entry.last_fetched_at = Some(Utc::now());
                slot.fetched_at = Some(Instant::now());
            }
            Err(error) => {
                // Previous data stays visible
                logger::warning(LogTag::Cache, &format!("{}: {}", key, error));
                slot.entry.error = Some(error);
            }
        }

        if slot.subscribers.is_empty() {
            logger::debug(
                LogTag::Cache,
                &format!("{}: response stored in warm entry without subscribers", key),
            );
        }

        slot.publish();
        true
    }
}

async fn run_request(shared: Arc<CacheShared>, key: String, token: u64) {
    let result = shared.fetcher.fetch(&key).await;
    shared.complete_request(&key, token, result);
}

async fn poll_loop(shared: Weak<CacheShared>, key: String, interval: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(strong) = shared.upgrade() else {
            break;
        };
        let Some(token) = strong.begin_poll(&key) else {
            continue;
        };

        // Spawned so the request completes even if this poller is replaced
        let runtime = strong.runtime.clone();
        let request = runtime.spawn(run_request(strong, key.clone(), token));
        if let Err(e) = request.await {
            logger::warning(LogTag::Cache, &format!("{}: poll request aborted: {}", key, e));
        }
    }
}

// ============================================================================
// RESOURCE CACHE
// ============================================================================

/// Shared cache of remote resources keyed by resource key
///
/// Cloning is cheap; clones share the same slots. Must be created from within
/// a tokio runtime; background work keeps running on that runtime.
#[derive(Clone)]
pub struct ResourceCache {
    shared: Arc<CacheShared>,
}

impl ResourceCache {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, config: &CacheConfig) -> Self {
        Self::with_dedupe_interval(fetcher, Duration::from_millis(config.dedupe_interval_ms))
    }

    /// `dedupe_interval` is the window in which a completed fetch still
    /// satisfies new subscribers without another request
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn with_dedupe_interval(fetcher: Arc<dyn ResourceFetcher>, dedupe_interval: Duration) -> Self {
        Self {
            shared: Arc::new(CacheShared {
                fetcher,
                dedupe_interval,
                slots: Mutex::new(HashMap::new()),
                next_subscriber: AtomicU64::new(1),
                runtime: Handle::current(),
            }),
        }
    }

    /// Subscribe to a key
    ///
    /// Returns immediately with whatever is cached (possibly nothing) and
    /// starts a background fetch unless the entry is fresh, already loading,
    /// or injected. `refresh` of `None` means fetch once, never poll.
    pub fn subscribe(&self, key: &str, refresh: Option<Duration>) -> Result<Subscription, CacheError> {
        validate_key(key)?;
        if refresh == Some(Duration::ZERO) {
            return Err(CacheError::ZeroInterval { key: key.to_string() });
        }

        let id = self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();

        let (receiver, token) = {
            let mut slots = self.shared.slots.lock();
            let slot = slots
                .entry(key.to_string())
                .or_insert_with(|| KeySlot::new(key));

            slot.subscribers.insert(id, refresh);
            let receiver = slot.notifier.subscribe();

            let needs_fetch = !slot.injected
                && !slot.entry.is_loading
                && !slot.is_fresh(now, self.shared.dedupe_interval);
            let token = needs_fetch.then(|| slot.begin_request());

            self.sync_poller(key, slot);

            if is_debug_cache_enabled() {
                logger::debug(
                    LogTag::Cache,
                    &format!(
                        "{}: subscriber {} registered (active={}, refresh={:?}, fetch={})",
                        key,
                        id,
                        slot.subscribers.len(),
                        refresh,
                        needs_fetch
                    ),
                );
            }

            (receiver, token)
        };

        if let Some(token) = token {
            self.spawn_request(key, token);
        }

        Ok(Subscription {
            cache: self.clone(),
            key: key.to_string(),
            id,
            receiver,
            active: true,
        })
    }

    /// Force an immediate fetch, superseding any request in flight
    ///
    /// Resets the key's polling timer. Completes once the new request has
    /// been applied. No-op for injected keys.
    pub async fn revalidate(&self, key: &str) {
        if validate_key(key).is_err() {
            logger::warning(LogTag::Cache, "revalidate called with an empty key");
            return;
        }

        let token = {
            let mut slots = self.shared.slots.lock();
            let slot = slots
                .entry(key.to_string())
                .or_insert_with(|| KeySlot::new(key));

            if slot.injected {
                logger::debug(LogTag::Cache, &format!("{}: revalidate ignored, value is injected", key));
                return;
            }

            let token = slot.begin_request();
            if let Some(interval) = slot.poll_interval() {
                slot.poller = Some(self.spawn_poller(key, interval));
            }
            token
        };

        logger::debug(LogTag::Cache, &format!("{}: revalidating (token={})", key, token));

        if let Err(e) = self.spawn_request(key, token).await {
            logger::warning(LogTag::Cache, &format!("{}: revalidation aborted: {}", key, e));
        }
    }

    /// Treat `value` as authoritative for `key`, bypassing the network
    ///
    /// Supersedes any request in flight and stops polling until
    /// [`clear_injected`](Self::clear_injected) is called.
    pub fn inject_value(&self, key: &str, value: Value) {
        let mut slots = self.shared.slots.lock();
        let slot = slots
            .entry(key.to_string())
            .or_insert_with(|| KeySlot::new(key));

        slot.injected = true;
        slot.entry.request_token += 1;
        slot.entry.is_loading = false;
        slot.entry.data = Some(Arc::new(value));
        slot.entry.error = None;
        slot.entry.last_fetched_at = Some(Utc::now());
        slot.fetched_at = Some(Instant::now());
        slot.poller = None;
        slot.publish();

        logger::debug(LogTag::Cache, &format!("{}: value injected", key));
    }

    /// Return an injected key to network mode
    ///
    /// With subscribers present, a fetch is issued and polling resumes.
    pub fn clear_injected(&self, key: &str) {
        let token = {
            let mut slots = self.shared.slots.lock();
            let Some(slot) = slots.get_mut(key) else {
                return;
            };
            if !slot.injected {
                return;
            }

            slot.injected = false;
            slot.fetched_at = None;
            let token = (!slot.subscribers.is_empty()).then(|| slot.begin_request());
            if token.is_none() {
                slot.publish();
            }
            self.sync_poller(key, slot);
            token
        };

        logger::debug(LogTag::Cache, &format!("{}: injection cleared", key));

        if let Some(token) = token {
            self.spawn_request(key, token);
        }
    }

    /// Send a write for `key`, then revalidate it
    pub async fn submit(&self, key: &str, body: Value) -> Result<Value, CacheError> {
        validate_key(key)?;
        if self.is_injected(key) {
            return Err(CacheError::Injected { key: key.to_string() });
        }

        let created = self.shared.fetcher.submit(key, &body).await.map_err(|e| {
            logger::warning(LogTag::Cache, &format!("{}: submit failed: {}", key, e));
            e
        })?;

        self.revalidate(key).await;
        Ok(created)
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    pub fn snapshot(&self, key: &str) -> Option<CacheSnapshot> {
        let slots = self.shared.slots.lock();
        slots.get(key).map(|slot| slot.entry.snapshot(slot.injected))
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.shared.slots.lock().get(key).map(|slot| slot.entry.clone())
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.shared
            .slots
            .lock()
            .get(key)
            .map_or(0, |slot| slot.subscribers.len())
    }

    /// Interval of the key's polling task, if one is running
    pub fn poll_interval(&self, key: &str) -> Option<Duration> {
        self.shared.slots.lock().get(key).and_then(|slot| slot.poll_interval())
    }

    /// Number of keys with a running polling task
    pub fn active_pollers(&self) -> usize {
        self.shared
            .slots
            .lock()
            .values()
            .filter(|slot| slot.poller.is_some())
            .count()
    }

    pub fn is_injected(&self, key: &str) -> bool {
        self.shared.slots.lock().get(key).map_or(false, |slot| slot.injected)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.shared.slots.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn unsubscribe(&self, key: &str, id: SubscriberId) {
        let mut slots = self.shared.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };

        slot.subscribers.remove(&id);
        self.sync_poller(key, slot);

        if is_debug_cache_enabled() {
            logger::debug(
                LogTag::Cache,
                &format!(
                    "{}: subscriber {} unregistered (active={}, polling={:?})",
                    key,
                    id,
                    slot.subscribers.len(),
                    slot.poll_interval()
                ),
            );
        }
    }

    /// Bring the slot's poller in line with its subscribers
    fn sync_poller(&self, key: &str, slot: &mut KeySlot) {
        let desired = if slot.injected { None } else { slot.effective_interval() };
        if desired == slot.poll_interval() {
            return;
        }
        slot.poller = desired.map(|interval| self.spawn_poller(key, interval));
    }

    fn spawn_poller(&self, key: &str, interval: Duration) -> Poller {
        let handle = self.shared.runtime.spawn(poll_loop(
            Arc::downgrade(&self.shared),
            key.to_string(),
            interval,
        ));
        Poller { interval, handle }
    }

    fn spawn_request(&self, key: &str, token: u64) -> JoinHandle<()> {
        self.shared
            .runtime
            .spawn(run_request(self.shared.clone(), key.to_string(), token))
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.shared.slots.lock();
        f.debug_struct("ResourceCache")
            .field("keys", &slots.len())
            .field("dedupe_interval", &self.shared.dedupe_interval)
            .finish()
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.trim().is_empty() {
        return Err(CacheError::EmptyKey);
    }
    Ok(())
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

/// A consumer's registration on one key
///
/// Dropping the subscription unsubscribes it.
pub struct Subscription {
    cache: ResourceCache,
    key: String,
    id: SubscriberId,
    receiver: watch::Receiver<CacheSnapshot>,
    active: bool,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Current state of the entry
    pub fn snapshot(&self) -> CacheSnapshot {
        self.receiver.borrow().clone()
    }

    pub fn value(&self) -> Option<Arc<Value>> {
        self.receiver.borrow().data.clone()
    }

    pub fn error(&self) -> Option<FetchError> {
        self.receiver.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().is_loading
    }

    /// Wait for the next change; `None` once the cache is gone
    pub async fn changed(&mut self) -> Option<CacheSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the snapshot satisfies `predicate` (checked immediately first)
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Option<CacheSnapshot>
    where
        F: FnMut(&CacheSnapshot) -> bool,
    {
        loop {
            {
                let current = self.receiver.borrow_and_update();
                if predicate(&current) {
                    return Some(current.clone());
                }
            }
            self.receiver.changed().await.ok()?;
        }
    }

    /// Trigger a revalidation of this subscription's key
    pub async fn revalidate(&self) {
        self.cache.revalidate(&self.key).await;
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.active {
            self.active = false;
            self.cache.unsubscribe(&self.key, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
