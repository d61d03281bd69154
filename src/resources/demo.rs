/// In-memory fetcher and demo payloads
///
/// Lets the cache run without a backend: `marketdash watch --demo` and the
/// test suites both route resource keys to canned JSON values here.
///
/// Covered keys:
/// - /api/snapshot, /api/movers, /api/breadth, /api/earnings
/// - /api/leadership, /api/news, /api/trades, /api/screener
/// - /api/traders, /api/rundown
use super::fetcher::ResourceFetcher;
use super::keys;
use crate::errors::FetchError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fetcher that serves routes from memory
///
/// Unknown keys answer with HTTP 404. Queued failures are returned before
/// the route is consulted, one per request.
#[derive(Default)]
pub struct MemoryFetcher {
    routes: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, VecDeque<FetchError>>>,
    calls: Mutex<HashMap<String, usize>>,
    submissions: Mutex<HashMap<String, usize>>,
    next_id: AtomicU64,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(self, key: &str, value: Value) -> Self {
        self.set_route(key, value);
        self
    }

    pub fn set_route(&self, key: &str, value: Value) {
        self.routes.lock().insert(key.to_string(), value);
    }

    pub fn route(&self, key: &str) -> Option<Value> {
        self.routes.lock().get(key).cloned()
    }

    /// Make the next request for `key` fail with `error`
    pub fn fail_next(&self, key: &str, error: FetchError) {
        self.failures
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_back(error);
    }

    /// GET requests made for `key`
    pub fn calls(&self, key: &str) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// POST requests made for `key`
    pub fn submissions(&self, key: &str) -> usize {
        self.submissions.lock().get(key).copied().unwrap_or(0)
    }

    fn take_failure(&self, key: &str) -> Option<FetchError> {
        self.failures.lock().get_mut(key).and_then(|queue| queue.pop_front())
    }
}

#[async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, key: &str) -> Result<Value, FetchError> {
        *self.calls.lock().entry(key.to_string()).or_insert(0) += 1;

        if let Some(error) = self.take_failure(key) {
            return Err(error);
        }

        self.route(key).ok_or_else(|| FetchError::HttpStatus {
            key: key.to_string(),
            status: 404,
        })
    }

    /// Append the body to the route's array, assigning an `id` when missing
    async fn submit(&self, key: &str, body: &Value) -> Result<Value, FetchError> {
        *self.submissions.lock().entry(key.to_string()).or_insert(0) += 1;

        if let Some(error) = self.take_failure(key) {
            return Err(error);
        }

        let mut record = body.clone();
        let Some(fields) = record.as_object_mut() else {
            return Err(FetchError::HttpStatus { key: key.to_string(), status: 422 });
        };
        if !fields.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            fields.insert("id".to_string(), json!(format!("m{:07}", id)));
        }

        let mut routes = self.routes.lock();
        let list = routes.entry(key.to_string()).or_insert_with(|| json!([]));
        match list.as_array_mut() {
            Some(items) => items.push(record.clone()),
            None => {
                return Err(FetchError::HttpStatus { key: key.to_string(), status: 405 });
            }
        }

        logger::debug(LogTag::Fetch, &format!("POST {} (memory) stored {}", key, record));
        Ok(record)
    }
}

// =============================================================================
// DEMO PAYLOADS - Realistic showcase values
// =============================================================================

/// (symbol, last, change %)
const DEMO_FUTURES: &[(&str, f64, f64)] = &[
    ("NQ", 18_342.25, 0.84),
    ("ES", 5_231.50, 0.41),
    ("RTY", 2_071.30, -0.22),
    ("YM", 39_118.00, 0.12),
    ("CL", 81.94, 1.35),
    ("GC", 2_338.10, -0.47),
    ("BTC", 67_412.00, 2.05),
    ("VIX", 13.42, -3.10),
];

/// (symbol, change %, volume, headline)
const DEMO_MOVERS: &[(&str, f64, u64, &str)] = &[
    ("SMCI", 11.4, 18_400_000, "Raised full-year guidance"),
    ("NVDA", 4.2, 52_100_000, "Sympathy with AI server names"),
    ("PLTR", 6.8, 64_900_000, "New defense contract"),
    ("TSLA", -3.9, 91_300_000, "Delivery miss"),
    ("INTC", -5.1, 72_800_000, "Foundry margin warning"),
];

/// Fetcher preloaded with a payload for every catalogued dashboard key
pub fn demo_fetcher() -> MemoryFetcher {
    let fetcher = MemoryFetcher::new();
    for (key, value) in demo_routes() {
        fetcher.set_route(&key, value);
    }
    fetcher
}

pub fn demo_routes() -> Vec<(String, Value)> {
    let futures: Vec<Value> = DEMO_FUTURES
        .iter()
        .map(|(sym, last, pct)| json!({ "sym": sym, "last": last, "chg_pct": pct }))
        .collect();

    let gainers: Vec<Value> = DEMO_MOVERS
        .iter()
        .filter(|(_, pct, _, _)| *pct > 0.0)
        .map(|(sym, pct, vol, why)| json!({ "sym": sym, "chg_pct": pct, "volume": vol, "catalyst": why }))
        .collect();
    let losers: Vec<Value> = DEMO_MOVERS
        .iter()
        .filter(|(_, pct, _, _)| *pct < 0.0)
        .map(|(sym, pct, vol, why)| json!({ "sym": sym, "chg_pct": pct, "volume": vol, "catalyst": why }))
        .collect();

    vec![
        (keys::SNAPSHOT.to_string(), json!({ "futures": futures })),
        (keys::MOVERS.to_string(), json!({ "gainers": gainers, "losers": losers })),
        (
            keys::BREADTH.to_string(),
            json!({
                "advancers": 2_841,
                "decliners": 1_977,
                "new_highs": 212,
                "new_lows": 64,
                "pct_above_50d": 61.3,
                "pct_above_200d": 68.9
            }),
        ),
        (
            keys::EARNINGS.to_string(),
            json!([
                { "sym": "AVGO", "when": "amc", "eps_est": 10.84 },
                { "sym": "COST", "when": "amc", "eps_est": 3.71 },
                { "sym": "ORCL", "when": "bmo", "eps_est": 1.38 }
            ]),
        ),
        (
            keys::LEADERSHIP.to_string(),
            json!([
                { "sym": "NVDA", "rs": 98, "group": "Semiconductors" },
                { "sym": "ANET", "rs": 95, "group": "Networking" },
                { "sym": "CELH", "rs": 93, "group": "Beverages" }
            ]),
        ),
        (
            keys::NEWS.to_string(),
            json!([
                { "headline": "Treasury yields slip ahead of CPI", "source": "wire", "tickers": ["TLT"] },
                { "headline": "SMCI lifts outlook on AI demand", "source": "wire", "tickers": ["SMCI"] }
            ]),
        ),
        (keys::TRADES.to_string(), json!([])),
        (
            keys::SCREENER.to_string(),
            json!([
                { "sym": "ANET", "setup": "flag", "adr_pct": 3.4 },
                { "sym": "CRWD", "setup": "pivot", "adr_pct": 4.1 }
            ]),
        ),
        (
            keys::TRADERS.to_string(),
            json!([
                { "handle": "swing_desk", "focus": "momentum", "win_rate": 0.58 },
                { "handle": "gap_reader", "focus": "episodic pivots", "win_rate": 0.52 }
            ]),
        ),
        (
            keys::RUNDOWN.to_string(),
            json!({
                "type": "pre_market",
                "summary": "Futures firm into CPI; semis lead after SMCI guide.",
                "focus": ["SMCI", "NVDA", "PLTR"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fetcher_routes_and_failures() {
        let fetcher = MemoryFetcher::new().with_route("/api/breadth", json!({"advancers": 10}));

        fetcher.fail_next(
            "/api/breadth",
            FetchError::Network { key: "/api/breadth".to_string(), message: "reset".to_string() },
        );
        assert!(fetcher.fetch("/api/breadth").await.is_err());
        assert_eq!(fetcher.fetch("/api/breadth").await.unwrap(), json!({"advancers": 10}));

        let missing = fetcher.fetch("/api/unknown").await.unwrap_err();
        assert_eq!(missing, FetchError::HttpStatus { key: "/api/unknown".to_string(), status: 404 });
        assert_eq!(fetcher.calls("/api/breadth"), 2);
        assert_eq!(fetcher.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_memory_fetcher_submit_appends() {
        let fetcher = MemoryFetcher::new().with_route("/api/trades", json!([]));

        let created = fetcher
            .submit("/api/trades", &json!({"sym": "NVDA", "status": "open"}))
            .await
            .unwrap();
        assert_eq!(created["id"], json!("m0000001"));
        assert_eq!(fetcher.route("/api/trades").unwrap().as_array().unwrap().len(), 1);

        let rejected = fetcher.submit("/api/breadth", &json!([1])).await.unwrap_err();
        assert!(matches!(rejected, FetchError::HttpStatus { status: 422, .. }));
    }

    #[test]
    fn test_demo_covers_polled_catalogue() {
        let fetcher = demo_fetcher();
        for spec in keys::CATALOGUE.iter().filter(|s| s.refresh_secs.is_some()) {
            assert!(fetcher.route(spec.key).is_some(), "missing demo payload for {}", spec.key);
        }
    }
}
