/// Per-symbol chart overrides
///
/// Built-in entries cover the symbols the futures/ETF strip renders whose
/// notation differs between backends. Config entries are layered on top.
use super::types::ChartOverrides;
use std::collections::{BTreeMap, HashMap};

/// Template for symbols charted by the dashboard's own service
pub const INTERNAL_CHART_TEMPLATE: &str = "/api/chart/{symbol}";

#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    entries: HashMap<String, ChartOverrides>,
}

impl SymbolRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Continuous futures, crypto and volatility symbols
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for future in ["NQ", "ES", "RTY", "YM", "CL", "GC"] {
            registry.insert(
                future,
                ChartOverrides::none()
                    .with_display_symbol(format!("{}1!", future))
                    .without_static(),
            );
        }
        registry.insert(
            "BTC",
            ChartOverrides::none().with_display_symbol("BTCUSD").without_static(),
        );
        registry.insert(
            "VIX",
            ChartOverrides::none()
                .with_display_symbol("CBOE:VIX")
                .without_static()
                .with_custom_endpoint(INTERNAL_CHART_TEMPLATE),
        );
        registry
    }

    /// Built-in entries with configured ones merged over them
    pub fn with_configured(configured: &BTreeMap<String, ChartOverrides>) -> Self {
        let mut registry = Self::builtin();
        for (symbol, overrides) in configured {
            let merged = registry.get(symbol).merged_with(overrides);
            registry.insert(symbol, merged);
        }
        registry
    }

    pub fn insert(&mut self, symbol: &str, overrides: ChartOverrides) {
        self.entries.insert(symbol.to_uppercase(), overrides);
    }

    /// Overrides for a symbol; unregistered symbols get none
    pub fn get(&self, symbol: &str) -> ChartOverrides {
        self.entries
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(&symbol.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
