/// Configuration schemas - all config structures defined once with defaults
use crate::charts::ChartOverrides;
use crate::config_struct;
use std::collections::BTreeMap;

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// Remote data service the cache engine reads from
    pub struct ServerConfig {
        /// Base URL that resource keys are joined onto
        base_url: String = "http://127.0.0.1:8000".to_string(),
        /// Per-request timeout; 0 disables it (a hung request blocks polling for its key)
        request_timeout_secs: u64 = 0,
        user_agent: String = "MarketDash/1.0".to_string(),
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

config_struct! {
    /// Resource cache engine tuning
    pub struct CacheConfig {
        /// Entries fetched within this window are fresh: subscribing does not refetch
        dedupe_interval_ms: u64 = 2_000,
        /// Per-key refresh interval overrides in seconds (0 = fetch once)
        refresh_overrides_secs: BTreeMap<String, u64> = BTreeMap::new(),
    }
}

// ============================================================================
// CHART CONFIGURATION
// ============================================================================

config_struct! {
    /// Chart provider endpoints and per-symbol overrides
    pub struct ChartConfig {
        static_image_base: String = "https://finviz.com/chart.ashx".to_string(),
        static_quote_base: String = "https://finviz.com/quote.ashx".to_string(),
        embed_base: String = "https://www.tradingview.com/widgetembed/".to_string(),
        embed_chart_base: String = "https://www.tradingview.com/chart/".to_string(),
        embed_theme: String = "dark".to_string(),
        /// Query parameter carrying the timeframe code on custom endpoints
        custom_endpoint_param: String = "tf".to_string(),
        /// Hover previews on ticker references
        preview_enabled: bool = true,
        /// Merged over the built-in symbol registry
        symbols: BTreeMap<String, ChartOverrides> = BTreeMap::new(),
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    pub struct Config {
        server: ServerConfig = ServerConfig::default(),
        cache: CacheConfig = CacheConfig::default(),
        charts: ChartConfig = ChartConfig::default(),
    }
}
