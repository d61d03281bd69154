//! Resource cache engine
//!
//! Shared, subscription-driven cache of the dashboard's remote resources.
//! Panels subscribe to a resource key with an optional refresh interval and
//! observe snapshots of the entry; the engine coalesces concurrent requests,
//! polls at the fastest requested interval and discards superseded responses.
//!
//! - `engine`: [`ResourceCache`] and [`Subscription`]
//! - `fetcher`: network seam ([`ResourceFetcher`], [`HttpFetcher`])
//! - `keys`: resource catalogue and refresh intervals
//! - `trades`: the writable trade log
//! - `demo`: in-memory fetcher with canned payloads

pub mod demo;
pub mod engine;
pub mod fetcher;
pub mod keys;
pub mod trades;
pub mod types;

pub use demo::{demo_fetcher, MemoryFetcher};
pub use engine::{ResourceCache, SubscriberId, Subscription};
pub use fetcher::{HttpFetcher, ResourceFetcher};
pub use keys::{refresh_interval_for, ResourceSpec, ThemePeriod, CATALOGUE};
pub use trades::{submit_trade, trades_from, NewTrade, Trade, TradeId};
pub use types::{CacheEntry, CacheSnapshot};
