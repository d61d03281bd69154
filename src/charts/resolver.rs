/// Chart provider resolution
///
/// Maps (symbol, timeframe, overrides) to a renderable source. Resolution
/// order: custom endpoint, then static image (daily/weekly only, unless
/// disabled for the symbol), then the embeddable frame.
use super::providers::ChartProviders;
use super::registry::SymbolRegistry;
use super::types::{ChartKind, ChartOverrides, ChartRequest, ChartSource, ExternalLink, Timeframe};
use crate::config::ChartConfig;
use crate::logger::{self, LogTag};
use once_cell::sync::Lazy;

/// The hover preview shows exactly one period
pub const PREVIEW_TIMEFRAME: Timeframe = Timeframe::Daily;

static DEFAULT_RESOLVER: Lazy<ChartResolver> = Lazy::new(ChartResolver::default);

#[derive(Debug, Clone)]
pub struct ChartResolver {
    providers: ChartProviders,
    registry: SymbolRegistry,
}

impl ChartResolver {
    pub fn new(config: ChartConfig) -> Self {
        let registry = SymbolRegistry::with_configured(&config.symbols);
        Self {
            providers: ChartProviders::new(config),
            registry,
        }
    }

    pub fn with_registry(config: ChartConfig, registry: SymbolRegistry) -> Self {
        Self {
            providers: ChartProviders::new(config),
            registry,
        }
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Whether hover previews are enabled at all
    pub fn previews_enabled(&self) -> bool {
        self.providers.config().preview_enabled
    }

    /// Registered overrides for a symbol
    pub fn overrides_for(&self, symbol: &str) -> ChartOverrides {
        self.registry.get(symbol)
    }

    /// Decide which backend serves (symbol, timeframe)
    pub fn plan(&self, symbol: &str, timeframe: Timeframe, overrides: &ChartOverrides) -> ChartRequest {
        let provider = if overrides.custom_endpoint.is_some() {
            ChartKind::CustomEndpoint
        } else if !overrides.disable_static && timeframe.static_period().is_some() {
            ChartKind::StaticImage
        } else {
            ChartKind::EmbeddedFrame
        };

        ChartRequest {
            symbol: symbol.to_string(),
            display_symbol: overrides.display_symbol.clone(),
            timeframe,
            provider,
        }
    }

    /// Resolve a chart source. Pure: same inputs always give the same output.
    pub fn resolve(&self, symbol: &str, timeframe: Timeframe, overrides: &ChartOverrides) -> ChartSource {
        let request = self.plan(symbol, timeframe, overrides);
        let backend_symbol = request.backend_symbol();

        let url = match (request.provider, overrides.custom_endpoint.as_deref()) {
            (ChartKind::CustomEndpoint, Some(template)) => {
                self.providers.custom_endpoint_url(template, backend_symbol, timeframe)
            }
            (ChartKind::StaticImage, _) => match timeframe.static_period() {
                Some(period) => self.providers.static_image_url(backend_symbol, period),
                None => self.providers.embed_url(backend_symbol, timeframe.interval_code()),
            },
            _ => self.providers.embed_url(backend_symbol, timeframe.interval_code()),
        };

        logger::verbose(
            LogTag::Charts,
            &format!("{} {} -> {:?} {}", symbol, timeframe, request.provider, url),
        );

        ChartSource {
            kind: request.provider,
            url,
            title: format!("{} {} chart", symbol, timeframe),
        }
    }

    /// Resolve using the registered overrides for the symbol
    pub fn resolve_registered(&self, symbol: &str, timeframe: Timeframe) -> ChartSource {
        self.resolve(symbol, timeframe, &self.overrides_for(symbol))
    }

    /// Single-period preview; `None` when the symbol has no static coverage
    pub fn preview(&self, symbol: &str, overrides: &ChartOverrides) -> Option<ChartSource> {
        if !self.previews_enabled() || overrides.disable_static {
            return None;
        }
        Some(self.resolve(symbol, PREVIEW_TIMEFRAME, overrides))
    }

    /// Navigation links shown under the modal chart
    pub fn external_links(&self, symbol: &str, overrides: &ChartOverrides) -> Vec<ExternalLink> {
        let mut links = Vec::with_capacity(2);
        if !overrides.disable_static {
            links.push(ExternalLink {
                label: "Open in FinViz".to_string(),
                url: self.providers.static_quote_url(symbol),
            });
        }
        let embed_symbol = overrides.display_symbol.as_deref().unwrap_or(symbol);
        links.push(ExternalLink {
            label: "Open in TradingView".to_string(),
            url: self.providers.embed_chart_url(embed_symbol),
        });
        links
    }
}

impl Default for ChartResolver {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

/// Resolve with default provider configuration
pub fn resolve(symbol: &str, timeframe: Timeframe, overrides: &ChartOverrides) -> ChartSource {
    DEFAULT_RESOLVER.resolve(symbol, timeframe, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_endpoint_takes_precedence() {
        let overrides = ChartOverrides::none()
            .without_static()
            .with_custom_endpoint("/api/chart/VIX");

        let source = resolve("VIX", Timeframe::Daily, &overrides);
        assert_eq!(source.kind, ChartKind::CustomEndpoint);
        assert_eq!(source.url, "/api/chart/VIX?tf=D");

        // Even when static is allowed and the timeframe has a static period
        let overrides = ChartOverrides::none().with_custom_endpoint("/api/chart/{symbol}");
        let source = resolve("SPY", Timeframe::Weekly, &overrides);
        assert_eq!(source.kind, ChartKind::CustomEndpoint);
        assert_eq!(source.url, "/api/chart/SPY?tf=W");
    }

    #[test]
    fn test_intraday_falls_back_to_embedded_frame() {
        let overrides = ChartOverrides::none().with_display_symbol("NQ1!");
        let source = resolve("NQ", Timeframe::FiveMin, &overrides);

        assert_eq!(source.kind, ChartKind::EmbeddedFrame);
        assert!(source.url.contains("symbol=NQ1!"));
        assert!(source.url.contains("interval=5&"));
    }

    #[test]
    fn test_daily_uses_static_image() {
        let source = resolve("NVDA", Timeframe::Daily, &ChartOverrides::none());
        assert_eq!(source.kind, ChartKind::StaticImage);
        assert_eq!(source.url, "https://finviz.com/chart.ashx?t=NVDA&ty=c&ta=1&p=d&s=l");
        assert_eq!(source.title, "NVDA Daily chart");

        // Static image keeps the plain symbol even with a display override
        let overrides = ChartOverrides::none().with_display_symbol("NASDAQ:NVDA");
        let source = resolve("NVDA", Timeframe::Weekly, &overrides);
        assert!(source.url.contains("t=NVDA&"));
        assert!(source.url.contains("p=w"));
    }

    #[test]
    fn test_static_disabled_never_yields_static_image() {
        let overrides = ChartOverrides::none().without_static();
        for tf in Timeframe::TABS {
            let source = resolve("BTC", tf, &overrides);
            assert_ne!(source.kind, ChartKind::StaticImage, "{} resolved to static", tf);
            assert!(source.url.contains(&format!("interval={}", tf.interval_code())));
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let resolver = ChartResolver::default();
        let overrides = ChartOverrides::none();
        let first = resolver.resolve("AAPL", Timeframe::Daily, &overrides);
        let second = resolver.resolve("AAPL", Timeframe::Daily, &overrides);
        assert_eq!(first, second);
        assert_eq!(first, resolve("AAPL", Timeframe::Daily, &overrides));
    }

    #[test]
    fn test_registered_symbols() {
        let resolver = ChartResolver::default();

        let vix = resolver.resolve_registered("VIX", Timeframe::OneHour);
        assert_eq!(vix.kind, ChartKind::CustomEndpoint);
        assert_eq!(vix.url, "/api/chart/VIX?tf=60");

        let es = resolver.resolve_registered("ES", Timeframe::Daily);
        assert_eq!(es.kind, ChartKind::EmbeddedFrame);
        assert!(es.url.contains("symbol=ES1!"));
        assert!(es.url.contains("interval=D"));
    }

    #[test]
    fn test_preview_and_links() {
        let resolver = ChartResolver::default();

        let preview = resolver.preview("NVDA", &ChartOverrides::none()).unwrap();
        assert_eq!(preview.kind, ChartKind::StaticImage);
        assert!(preview.url.contains("p=d"));
        assert!(resolver.preview("BTC", &resolver.overrides_for("BTC")).is_none());

        let links = resolver.external_links("NVDA", &ChartOverrides::none());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://finviz.com/quote.ashx?t=NVDA");
        assert_eq!(links[1].url, "https://www.tradingview.com/chart/?symbol=NVDA");

        let links = resolver.external_links("NQ", &resolver.overrides_for("NQ"));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://www.tradingview.com/chart/?symbol=NQ1!");
    }

    #[test]
    fn test_previews_can_be_disabled() {
        let config = ChartConfig {
            preview_enabled: false,
            ..ChartConfig::default()
        };
        let resolver = ChartResolver::new(config);
        assert!(resolver.preview("NVDA", &ChartOverrides::none()).is_none());
    }
}
