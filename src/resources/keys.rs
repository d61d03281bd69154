/// Resource keys consumed by the dashboard panels and their refresh intervals
use crate::config::CacheConfig;
use std::fmt;
use std::time::Duration;

pub const SNAPSHOT: &str = "/api/snapshot";
pub const MOVERS: &str = "/api/movers";
pub const BREADTH: &str = "/api/breadth";
pub const EARNINGS: &str = "/api/earnings";
pub const LEADERSHIP: &str = "/api/leadership";
pub const NEWS: &str = "/api/news";
pub const TRADES: &str = "/api/trades";
pub const SCREENER: &str = "/api/screener";
pub const TRADERS: &str = "/api/traders";
pub const RUNDOWN: &str = "/api/rundown";
pub const POST_MARKET_RUNDOWN: &str = "/api/rundown?type=post_market";

/// A catalogued resource and the panel that consumes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub key: &'static str,
    /// `None` = fetch once, never poll
    pub refresh_secs: Option<u64>,
    pub consumer: &'static str,
}

impl ResourceSpec {
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_secs.map(Duration::from_secs)
    }
}

pub const CATALOGUE: &[ResourceSpec] = &[
    ResourceSpec { key: SNAPSHOT, refresh_secs: Some(10), consumer: "futures/ETF strip" },
    ResourceSpec { key: MOVERS, refresh_secs: Some(30), consumer: "movers panel" },
    ResourceSpec { key: BREADTH, refresh_secs: None, consumer: "breadth panel" },
    ResourceSpec { key: EARNINGS, refresh_secs: None, consumer: "catalyst/earnings panel" },
    ResourceSpec { key: LEADERSHIP, refresh_secs: Some(3_600), consumer: "leadership panel" },
    ResourceSpec { key: NEWS, refresh_secs: Some(300), consumer: "news feed" },
    ResourceSpec { key: TRADES, refresh_secs: Some(60), consumer: "trade log" },
    ResourceSpec { key: SCREENER, refresh_secs: Some(900), consumer: "screener" },
    ResourceSpec { key: TRADERS, refresh_secs: Some(60), consumer: "traders page" },
    ResourceSpec { key: RUNDOWN, refresh_secs: Some(300), consumer: "morning wire" },
    ResourceSpec { key: POST_MARKET_RUNDOWN, refresh_secs: None, consumer: "post-market page" },
];

/// Theme tracker lookback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemePeriod {
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl ThemePeriod {
    pub const ALL: [ThemePeriod; 3] = [ThemePeriod::OneWeek, ThemePeriod::OneMonth, ThemePeriod::ThreeMonths];

    pub fn code(&self) -> &'static str {
        match self {
            ThemePeriod::OneWeek => "1W",
            ThemePeriod::OneMonth => "1M",
            ThemePeriod::ThreeMonths => "3M",
        }
    }
}

impl fmt::Display for ThemePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `/api/themes?period={1W|1M|3M}`, fetched on demand
pub fn themes(period: ThemePeriod) -> String {
    format!("/api/themes?period={}", period.code())
}

/// `/api/snapshot/{symbol}`, fetched once per detail view
pub fn symbol_snapshot(symbol: &str) -> String {
    format!("{}/{}", SNAPSHOT, symbol.trim().to_uppercase())
}

pub fn lookup(key: &str) -> Option<&'static ResourceSpec> {
    CATALOGUE.iter().find(|spec| spec.key == key)
}

/// Refresh interval for a key: config override first, then the catalogue
///
/// A configured value of 0 means "fetch once". Uncatalogued keys (themes,
/// per-symbol snapshots) are fetched once unless configured.
pub fn refresh_interval_for(key: &str, config: &CacheConfig) -> Option<Duration> {
    if let Some(secs) = config.refresh_overrides_secs.get(key) {
        return (*secs > 0).then(|| Duration::from_secs(*secs));
    }
    lookup(key).and_then(|spec| spec.refresh_interval())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_intervals() {
        assert_eq!(lookup(SNAPSHOT).unwrap().refresh_secs, Some(10));
        assert_eq!(lookup(SCREENER).unwrap().refresh_secs, Some(900));
        assert_eq!(lookup(BREADTH).unwrap().refresh_secs, None);
        assert!(lookup("/api/unknown").is_none());
    }

    #[test]
    fn test_parameterized_keys() {
        assert_eq!(themes(ThemePeriod::ThreeMonths), "/api/themes?period=3M");
        assert_eq!(symbol_snapshot(" nvda"), "/api/snapshot/NVDA");
    }

    #[test]
    fn test_config_overrides_catalogue() {
        let mut config = CacheConfig::default();
        assert_eq!(refresh_interval_for(NEWS, &config), Some(Duration::from_secs(300)));
        assert_eq!(refresh_interval_for(&themes(ThemePeriod::OneWeek), &config), None);

        config.refresh_overrides_secs.insert(NEWS.to_string(), 120);
        config.refresh_overrides_secs.insert(MOVERS.to_string(), 0);
        assert_eq!(refresh_interval_for(NEWS, &config), Some(Duration::from_secs(120)));
        assert_eq!(refresh_interval_for(MOVERS, &config), None);
    }
}
