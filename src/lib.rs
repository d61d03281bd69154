pub mod arguments;
pub mod charts;
pub mod config;
pub mod errors; // Structured error handling
pub mod logger;
pub mod overlay;
pub mod resources;

pub use charts::{ChartKind, ChartOverrides, ChartResolver, ChartSource, Timeframe};
pub use errors::{CacheError, ChartError, ConfigError, FetchError};
pub use overlay::{OverlayBoard, OverlayEvent, OverlayPhase, TickerOverlay};
pub use resources::{CacheSnapshot, ResourceCache, ResourceFetcher, Subscription};
