/// Trade log records and submission
///
/// The trade log is the one writable resource: a POST to `/api/trades`
/// creates a record (the server assigns `id` and `status`), after which the
/// cached list is revalidated so every subscriber sees the new trade.
use super::engine::ResourceCache;
use super::keys;
use super::types::CacheSnapshot;
use crate::errors::{CacheError, FetchError};
use crate::logger::{self, LogTag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade as entered in the log form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub sym: String,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub size_pct: f64,
    #[serde(default)]
    pub notes: String,
}

impl NewTrade {
    pub fn new(sym: &str, entry: f64, stop: f64, target: f64, size_pct: f64) -> Self {
        Self {
            sym: sym.trim().to_uppercase(),
            entry,
            stop,
            target,
            size_pct,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }
}

/// Server-assigned trade identifier (numeric or short string)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TradeId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeId::Number(n) => write!(f, "{}", n),
            TradeId::Text(s) => f.write_str(s),
        }
    }
}

fn default_status() -> String {
    "open".to_string()
}

/// Trade as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub sym: String,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub size_pct: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == "open"
    }
}

/// Create a trade and refresh the cached trade list
pub async fn submit_trade(cache: &ResourceCache, trade: &NewTrade) -> Result<Trade, CacheError> {
    let body = serde_json::to_value(trade).map_err(|e| FetchError::Decode {
        key: keys::TRADES.to_string(),
        message: format!("Failed to encode trade: {}", e),
    })?;

    let created = cache.submit(keys::TRADES, body).await?;
    let trade: Trade = serde_json::from_value(created).map_err(|e| FetchError::Decode {
        key: keys::TRADES.to_string(),
        message: format!("Unexpected trade record: {}", e),
    })?;

    logger::info(
        LogTag::Cache,
        &format!("Trade {} logged for {} ({})", trade.id, trade.sym, trade.status),
    );
    Ok(trade)
}

/// Trades from a `/api/trades` snapshot; empty before the first load
pub fn trades_from(snapshot: &CacheSnapshot) -> Result<Vec<Trade>, serde_json::Error> {
    snapshot.decode::<Vec<Trade>>().unwrap_or_else(|| Ok(Vec::new()))
}
