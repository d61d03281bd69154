/// Cache entry and snapshot types
use crate::errors::FetchError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Engine-owned state for one resource key
///
/// Only the engine mutates entries; consumers see [`CacheSnapshot`] copies.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    /// Last successfully retrieved value; kept across failures
    pub data: Option<Arc<Value>>,
    /// Last failure, cleared by the next success
    pub error: Option<FetchError>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub is_loading: bool,
    /// Stamp of the most recently issued request; older stamps are discarded
    pub request_token: u64,
}

impl CacheEntry {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            data: None,
            error: None,
            last_fetched_at: None,
            is_loading: false,
            request_token: 0,
        }
    }

    pub fn snapshot(&self, injected: bool) -> CacheSnapshot {
        CacheSnapshot {
            key: self.key.clone(),
            data: self.data.clone(),
            error: self.error.clone(),
            last_fetched_at: self.last_fetched_at,
            is_loading: self.is_loading,
            injected,
        }
    }
}

/// Read-only view of a cache entry handed to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub key: String,
    pub data: Option<Arc<Value>>,
    pub error: Option<FetchError>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub is_loading: bool,
    /// Value supplied through `inject_value` rather than the network
    pub injected: bool,
}

impl CacheSnapshot {
    pub fn empty(key: &str) -> Self {
        CacheEntry::new(key).snapshot(false)
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Deserialize the payload into a typed value
    ///
    /// `None` before the first load; `Some(Err)` when the payload does not
    /// match the requested shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.data
            .as_ref()
            .map(|value| T::deserialize(value.as_ref()))
    }

    /// Number of elements when the payload is a JSON array
    pub fn array_len(&self) -> Option<usize> {
        self.data.as_ref().and_then(|v| v.as_array()).map(|a| a.len())
    }
}
