/// URL construction for each chart backend
///
/// Every function here is pure string building over the configured base URLs.
use super::types::Timeframe;
use crate::config::ChartConfig;

/// Placeholder substituted with the symbol in custom endpoint templates
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";
/// Placeholder substituted with the timeframe code in custom endpoint templates
pub const TIMEFRAME_PLACEHOLDER: &str = "{tf}";

#[derive(Debug, Clone)]
pub struct ChartProviders {
    config: ChartConfig,
}

impl ChartProviders {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Static candlestick image for a period code (`d` / `w`)
    pub fn static_image_url(&self, symbol: &str, period: &str) -> String {
        format!(
            "{}?t={}&ty=c&ta=1&p={}&s=l",
            self.config.static_image_base, symbol, period
        )
    }

    /// Embeddable interactive widget for an interval code
    pub fn embed_url(&self, symbol: &str, interval: &str) -> String {
        format!(
            "{}?symbol={}&interval={}&theme={}&style=1&locale=en&hide_top_toolbar=0&hideideas=1",
            self.config.embed_base, symbol, interval, self.config.embed_theme
        )
    }

    /// Internal chart endpoint built from a template
    ///
    /// `{symbol}` is replaced by the symbol. The timeframe code replaces `{tf}`
    /// when the template has one, otherwise it is appended as a query parameter.
    pub fn custom_endpoint_url(&self, template: &str, symbol: &str, timeframe: Timeframe) -> String {
        let code = timeframe.interval_code();
        let url = template.replace(SYMBOL_PLACEHOLDER, symbol);

        if url.contains(TIMEFRAME_PLACEHOLDER) {
            return url.replace(TIMEFRAME_PLACEHOLDER, code);
        }

        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}{}={}", url, separator, self.config.custom_endpoint_param, code)
    }

    /// Quote page on the static-image provider's site
    pub fn static_quote_url(&self, symbol: &str) -> String {
        format!("{}?t={}", self.config.static_quote_base, symbol)
    }

    /// Full chart page on the embeddable-frame provider's site
    pub fn embed_chart_url(&self, symbol: &str) -> String {
        format!("{}?symbol={}", self.config.embed_chart_base, symbol)
    }
}

impl Default for ChartProviders {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_endpoint_templates() {
        let providers = ChartProviders::default();

        assert_eq!(
            providers.custom_endpoint_url("/api/chart/VIX", "VIX", Timeframe::Daily),
            "/api/chart/VIX?tf=D"
        );
        assert_eq!(
            providers.custom_endpoint_url("/api/chart/{symbol}", "BTC", Timeframe::OneHour),
            "/api/chart/BTC?tf=60"
        );
        assert_eq!(
            providers.custom_endpoint_url("/api/chart/{symbol}?theme=dark", "VIX", Timeframe::Weekly),
            "/api/chart/VIX?theme=dark&tf=W"
        );
        assert_eq!(
            providers.custom_endpoint_url("/charts/{symbol}/{tf}.png", "VIX", Timeframe::FiveMin),
            "/charts/VIX/5.png"
        );
    }

    #[test]
    fn test_static_image_url() {
        let providers = ChartProviders::default();
        assert_eq!(
            providers.static_image_url("NVDA", "d"),
            "https://finviz.com/chart.ashx?t=NVDA&ty=c&ta=1&p=d&s=l"
        );
    }

    #[test]
    fn test_base_urls_come_from_config() {
        let config = ChartConfig {
            embed_base: "https://charts.example/embed".to_string(),
            embed_theme: "light".to_string(),
            ..ChartConfig::default()
        };
        let providers = ChartProviders::new(config);
        let url = providers.embed_url("SPY", "W");
        assert!(url.starts_with("https://charts.example/embed?symbol=SPY&interval=W"));
        assert!(url.contains("theme=light"));
    }
}
