//! Resource cache engine integration tests
//!
//! Drive the public API with in-memory fetchers. Overlapping requests are
//! forced with a scripted fetcher whose responses can be held at a gate.

use async_trait::async_trait;
use marketdash::errors::FetchError;
use marketdash::resources::keys::{MOVERS, NEWS, SCREENER, SNAPSHOT, TRADES};
use marketdash::resources::{
    submit_trade, trades_from, MemoryFetcher, NewTrade, ResourceCache, ResourceFetcher, TradeId,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const DEDUPE: Duration = Duration::from_secs(2);

struct Step {
    gate: Option<Arc<Notify>>,
    result: Result<Value, FetchError>,
}

impl Step {
    fn ready(value: Value) -> Self {
        Self { gate: None, result: Ok(value) }
    }

    fn gated(gate: &Arc<Notify>, value: Value) -> Self {
        Self { gate: Some(gate.clone()), result: Ok(value) }
    }
}

/// Answers requests from a script, in order; `null` once the script runs out
struct ScriptedFetcher {
    steps: Mutex<VecDeque<Step>>,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    async fn fetch(&self, _key: &str) -> Result<Value, FetchError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().pop_front();
        let result = match step {
            Some(Step { gate, result }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None => Ok(Value::Null),
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Let spawned request tasks run to their next suspension point
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_subscribers_share_one_request() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(MOVERS, json!({"gainers": [], "losers": []})));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let mut subscriptions: Vec<_> = (0..5)
        .map(|_| cache.subscribe(MOVERS, Some(Duration::from_secs(30))).unwrap())
        .collect();
    assert!(subscriptions.iter().all(|s| s.is_loading()));

    subscriptions[0].wait_for(|s| s.has_data()).await.unwrap();
    assert_eq!(fetcher.calls(MOVERS), 1);
    assert!(subscriptions.iter().all(|s| s.value().is_some()));

    // Inside the window the completed fetch still counts as fresh
    let late = cache.subscribe(MOVERS, Some(Duration::from_secs(30))).unwrap();
    assert!(late.snapshot().has_data());
    assert!(!late.is_loading());
    settle().await;
    assert_eq!(fetcher.calls(MOVERS), 1);

    tokio::time::advance(Duration::from_secs(3)).await;
    let _stale = cache.subscribe(MOVERS, Some(Duration::from_secs(30))).unwrap();
    settle().await;
    assert_eq!(fetcher.calls(MOVERS), 2);

    assert_eq!(cache.subscriber_count(MOVERS), 7);
    assert_eq!(cache.active_pollers(), 1);
}

#[tokio::test]
async fn test_revalidate_discards_superseded_response() {
    let gate = Arc::new(Notify::new());
    let fetcher = ScriptedFetcher::new(vec![
        Step::gated(&gate, json!({"version": "old"})),
        Step::ready(json!({"version": "new"})),
    ]);
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let subscription = cache.subscribe(SCREENER, Some(Duration::from_secs(900))).unwrap();
    settle().await;
    assert_eq!(fetcher.started(), 1);
    assert_eq!(fetcher.finished(), 0);

    cache.revalidate(SCREENER).await;
    assert_eq!(subscription.value().as_deref(), Some(&json!({"version": "new"})));
    assert!(!subscription.is_loading());

    // The first request completes late and must not win
    gate.notify_one();
    settle().await;
    assert_eq!(fetcher.finished(), 2);

    let entry = cache.entry(SCREENER).unwrap();
    assert_eq!(entry.data.as_deref(), Some(&json!({"version": "new"})));
    assert_eq!(entry.request_token, 2);
    assert!(entry.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribe_stops_polling_and_resubscribe_reuses_entry() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(SNAPSHOT, json!({"futures": []})));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let mut subscription = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
    subscription.wait_for(|s| s.has_data()).await.unwrap();
    assert_eq!(fetcher.calls(SNAPSHOT), 1);

    // Polls at 10s and 20s
    tokio::time::sleep(Duration::from_secs(25)).await;
    settle().await;
    assert_eq!(fetcher.calls(SNAPSHOT), 3);

    drop(subscription);
    assert_eq!(cache.active_pollers(), 0);
    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(fetcher.calls(SNAPSHOT), 3);

    // Warm entry renders immediately while the refresh runs
    let first = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
    let second = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
    assert!(first.snapshot().has_data());
    assert!(second.is_loading());
    assert_eq!(cache.active_pollers(), 1);

    tokio::time::sleep(Duration::from_secs(15)).await;
    settle().await;
    // One refresh on re-subscribe plus a single poll: no duplicated timer
    assert_eq!(fetcher.calls(SNAPSHOT), 5);
}

#[tokio::test(start_paused = true)]
async fn test_revalidate_restarts_poll_timer() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(SNAPSHOT, json!({"futures": []})));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let mut subscription = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
    subscription.wait_for(|s| s.has_data()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(8)).await;
    subscription.revalidate().await;
    assert_eq!(fetcher.calls(SNAPSHOT), 2);

    // The poll due at t=10 was cancelled; the next one is at t=18
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(fetcher.calls(SNAPSHOT), 2);

    tokio::time::sleep(Duration::from_secs(6)).await;
    settle().await;
    assert_eq!(fetcher.calls(SNAPSHOT), 3);
}

#[test]
fn test_subscription_dropped_outside_runtime() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let fetcher = Arc::new(MemoryFetcher::new().with_route(SNAPSHOT, json!({"futures": []})));

    let (cache, slow, fast) = runtime.block_on(async {
        let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);
        let slow = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(30))).unwrap();
        let mut fast = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
        fast.wait_for(|s| s.has_data()).await.unwrap();
        (cache, slow, fast)
    });
    assert_eq!(cache.poll_interval(SNAPSHOT), Some(Duration::from_secs(10)));

    // Fastest subscriber leaves: the poller is replaced at the slower interval
    drop(fast);
    assert_eq!(cache.poll_interval(SNAPSHOT), Some(Duration::from_secs(30)));

    drop(slow);
    assert_eq!(cache.active_pollers(), 0);

    runtime.block_on(async {
        let subscription = cache.subscribe(SNAPSHOT, None).unwrap();
        assert!(subscription.snapshot().has_data());
    });
}

#[tokio::test]
async fn test_failure_retains_previous_data() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(NEWS, json!([{"headline": "CPI cools"}])));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let mut subscription = cache.subscribe(NEWS, Some(Duration::from_secs(300))).unwrap();
    let loaded = subscription.wait_for(|s| s.has_data()).await.unwrap();

    let outage = FetchError::HttpStatus { key: NEWS.to_string(), status: 503 };
    fetcher.fail_next(NEWS, outage.clone());
    cache.revalidate(NEWS).await;

    let failed = subscription.snapshot();
    assert_eq!(failed.error, Some(outage));
    assert_eq!(failed.data, loaded.data);
    assert_eq!(failed.last_fetched_at, loaded.last_fetched_at);
    assert!(!failed.is_loading);

    cache.revalidate(NEWS).await;
    let recovered = subscription.snapshot();
    assert!(recovered.error.is_none());
    assert!(recovered.has_data());
}

#[tokio::test]
async fn test_trade_submission_refreshes_trade_log() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(
        TRADES,
        json!([{
            "id": 1, "sym": "NVDA", "entry": 880, "stop": 850, "target": 960,
            "size_pct": 5, "status": "open"
        }]),
    ));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let mut subscription = cache.subscribe(TRADES, Some(Duration::from_secs(60))).unwrap();
    let loaded = subscription.wait_for(|s| s.has_data()).await.unwrap();
    assert_eq!(loaded.array_len(), Some(1));

    let trade = NewTrade::new("amd", 162.5, 155.0, 180.0, 3.0).with_notes("earnings gap");
    let created = submit_trade(&cache, &trade).await.unwrap();
    assert_eq!(created.sym, "AMD");
    assert!(created.is_open());

    let refreshed = subscription.snapshot();
    assert_eq!(refreshed.array_len(), Some(2));
    let trades = trades_from(&refreshed).unwrap();
    assert_eq!(trades[0].id, TradeId::Number(1));
    assert_eq!(trades[1].sym, "AMD");
    assert_eq!(fetcher.calls(TRADES), 2);
    assert_eq!(fetcher.submissions(TRADES), 1);
}

#[tokio::test(start_paused = true)]
async fn test_injected_value_bypasses_network() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(SNAPSHOT, json!({"source": "network"})));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    cache.inject_value(SNAPSHOT, json!({"source": "stream"}));
    let mut subscription = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
    let snapshot = subscription.snapshot();
    assert!(snapshot.injected);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.data.as_deref(), Some(&json!({"source": "stream"})));
    assert_eq!(cache.active_pollers(), 0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    cache.revalidate(SNAPSHOT).await;
    assert_eq!(fetcher.calls(SNAPSHOT), 0);

    cache.clear_injected(SNAPSHOT);
    let live = subscription
        .wait_for(|s| s.data.as_deref() == Some(&json!({"source": "network"})))
        .await
        .unwrap();
    assert!(!live.injected);
    assert_eq!(fetcher.calls(SNAPSHOT), 1);
    assert_eq!(cache.poll_interval(SNAPSHOT), Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn test_injection_supersedes_request_in_flight() {
    let gate = Arc::new(Notify::new());
    let fetcher = ScriptedFetcher::new(vec![Step::gated(&gate, json!({"source": "network"}))]);
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let subscription = cache.subscribe(SNAPSHOT, None).unwrap();
    settle().await;
    cache.inject_value(SNAPSHOT, json!({"source": "stream"}));

    gate.notify_one();
    settle().await;
    assert_eq!(fetcher.finished(), 1);
    assert_eq!(subscription.value().as_deref(), Some(&json!({"source": "stream"})));
}

#[tokio::test]
async fn test_response_after_last_unsubscribe_warms_entry() {
    let gate = Arc::new(Notify::new());
    let fetcher = ScriptedFetcher::new(vec![Step::gated(&gate, json!({"adv": 2841}))]);
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let subscription = cache.subscribe(SNAPSHOT, Some(Duration::from_secs(10))).unwrap();
    settle().await;
    subscription.unsubscribe();
    assert_eq!(cache.active_pollers(), 0);

    gate.notify_one();
    settle().await;

    let entry = cache.entry(SNAPSHOT).unwrap();
    assert_eq!(entry.data.as_deref(), Some(&json!({"adv": 2841})));
    assert!(!entry.is_loading);
    assert_eq!(cache.subscriber_count(SNAPSHOT), 0);

    // Fresh enough: a new subscriber renders it without another request
    let again = cache.subscribe(SNAPSHOT, None).unwrap();
    assert!(again.snapshot().has_data());
    settle().await;
    assert_eq!(fetcher.started(), 1);
}

#[tokio::test]
async fn test_subscription_observes_each_change() {
    let fetcher = Arc::new(MemoryFetcher::new().with_route(MOVERS, json!({"gainers": ["SMCI"]})));
    let cache = ResourceCache::with_dedupe_interval(fetcher.clone(), DEDUPE);

    let mut subscription = cache.subscribe(MOVERS, None).unwrap();
    let loaded = subscription.changed().await.unwrap();
    assert!(loaded.has_data() || loaded.is_loading);
    subscription.wait_for(|s| s.has_data()).await.unwrap();

    fetcher.set_route(MOVERS, json!({"gainers": ["SMCI", "PLTR"]}));
    let revalidating = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.revalidate(MOVERS).await })
    };
    let updated = subscription
        .wait_for(|s| !s.is_loading && s.data.as_deref() == Some(&json!({"gainers": ["SMCI", "PLTR"]})))
        .await
        .unwrap();
    assert!(updated.error.is_none());
    revalidating.await.unwrap();
}
