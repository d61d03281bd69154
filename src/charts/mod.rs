//! Chart provider resolution
//!
//! Pure mapping from a symbol and timeframe to a chart source: a static
//! image, an embeddable frame, or the dashboard's internal chart endpoint.

pub mod providers;
pub mod registry;
pub mod resolver;
pub mod types;

pub use providers::ChartProviders;
pub use registry::{SymbolRegistry, INTERNAL_CHART_TEMPLATE};
pub use resolver::{resolve, ChartResolver, PREVIEW_TIMEFRAME};
pub use types::{ChartKind, ChartOverrides, ChartRequest, ChartSource, ExternalLink, Timeframe};
