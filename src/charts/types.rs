/// Chart domain types shared by the resolver and the overlay controller
use crate::errors::ChartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// TIMEFRAME
// ============================================================================

/// Chart timeframe, in tab-strip order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5min")]
    FiveMin,
    #[serde(rename = "30min")]
    ThirtyMin,
    #[serde(rename = "1hr")]
    OneHour,
    Daily,
    Weekly,
}

impl Timeframe {
    /// Modal tab strip, left to right
    pub const TABS: [Timeframe; 5] = [
        Timeframe::FiveMin,
        Timeframe::ThirtyMin,
        Timeframe::OneHour,
        Timeframe::Daily,
        Timeframe::Weekly,
    ];

    /// Timeframe a freshly opened modal starts on
    pub const DEFAULT: Timeframe = Timeframe::Daily;

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::FiveMin => "5min",
            Timeframe::ThirtyMin => "30min",
            Timeframe::OneHour => "1hr",
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
        }
    }

    /// Interval code shared by the embeddable-frame backend and custom endpoints
    pub fn interval_code(&self) -> &'static str {
        match self {
            Timeframe::FiveMin => "5",
            Timeframe::ThirtyMin => "30",
            Timeframe::OneHour => "60",
            Timeframe::Daily => "D",
            Timeframe::Weekly => "W",
        }
    }

    /// Static-image period code; only daily and weekly charts exist as images
    pub fn static_period(&self) -> Option<&'static str> {
        match self {
            Timeframe::Daily => Some("d"),
            Timeframe::Weekly => Some("w"),
            _ => None,
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::DEFAULT
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = ChartError;

    /// Accepts tab labels ("5min", "Daily") and interval codes ("5", "D"),
    /// case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Timeframe::TABS
            .iter()
            .copied()
            .find(|tf| {
                tf.label().eq_ignore_ascii_case(needle) || tf.interval_code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ChartError::UnknownTimeframe(s.to_string()))
    }
}

// ============================================================================
// RESOLVED SOURCES
// ============================================================================

/// Which backend renders the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    /// Pre-rendered image (`<img>`)
    StaticImage,
    /// Third-party interactive widget (`<iframe>`)
    EmbeddedFrame,
    /// Image produced by the dashboard's own chart service
    CustomEndpoint,
}

/// A renderable chart source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSource {
    pub kind: ChartKind,
    pub url: String,
    pub title: String,
}

/// Provider decision for one (symbol, timeframe); recomputed on every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub display_symbol: Option<String>,
    pub timeframe: Timeframe,
    pub provider: ChartKind,
}

impl ChartRequest {
    /// Symbol in the notation of the chosen backend
    pub fn backend_symbol(&self) -> &str {
        match self.provider {
            ChartKind::EmbeddedFrame => self.display_symbol.as_deref().unwrap_or(&self.symbol),
            ChartKind::StaticImage | ChartKind::CustomEndpoint => &self.symbol,
        }
    }
}

/// Read-only navigation link to a third-party chart site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub label: String,
    pub url: String,
}

// ============================================================================
// PER-SYMBOL OVERRIDES
// ============================================================================

/// Per-symbol provider adjustments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOverrides {
    /// Notation used by the embeddable-frame backend (e.g. `NQ1!`)
    pub display_symbol: Option<String>,
    /// The static-image backend does not cover this symbol
    pub disable_static: bool,
    /// Internal endpoint template; `{symbol}` and `{tf}` are substituted
    pub custom_endpoint: Option<String>,
}

impl ChartOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_display_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.display_symbol = Some(symbol.into());
        self
    }

    pub fn without_static(mut self) -> Self {
        self.disable_static = true;
        self
    }

    pub fn with_custom_endpoint(mut self, template: impl Into<String>) -> Self {
        self.custom_endpoint = Some(template.into());
        self
    }

    /// Layer `other` over `self`; set fields in `other` win
    pub fn merged_with(&self, other: &ChartOverrides) -> ChartOverrides {
        ChartOverrides {
            display_symbol: other.display_symbol.clone().or_else(|| self.display_symbol.clone()),
            disable_static: self.disable_static || other.disable_static,
            custom_endpoint: other.custom_endpoint.clone().or_else(|| self.custom_endpoint.clone()),
        }
    }
}
