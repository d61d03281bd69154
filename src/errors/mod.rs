/// Structured error types for the dashboard core
///
/// Failures inside the cache engine are stored on the cache entry and surfaced
/// through snapshots; they never cross a subscriber boundary as a panic.
/// Stale (superseded) responses are not errors and have no variant here.
use thiserror::Error;

// =============================================================================
// FETCH ERRORS - stored on cache entries, must stay cloneable
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error for {key}: {message}")] Network {
        key: String,
        message: String,
    },

    #[error("HTTP {status} for {key}")] HttpStatus {
        key: String,
        status: u16,
    },

    #[error("Malformed payload for {key}: {message}")] Decode {
        key: String,
        message: String,
    },

    #[error("{operation} is not supported for {key}")] Unsupported {
        key: String,
        operation: String,
    },
}

impl FetchError {
    /// Key the failed request was issued for
    pub fn key(&self) -> &str {
        match self {
            FetchError::Network { key, .. } => key,
            FetchError::HttpStatus { key, .. } => key,
            FetchError::Decode { key, .. } => key,
            FetchError::Unsupported { key, .. } => key,
        }
    }

    /// Whether a later poll or manual revalidation can plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            FetchError::Network { .. } => true,
            FetchError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            FetchError::Decode { .. } => true,
            FetchError::Unsupported { .. } => false,
        }
    }
}

// =============================================================================
// CACHE ERRORS - misuse of the engine's public contract
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Resource key must not be empty")] EmptyKey,

    #[error("Refresh interval for {key} must be positive")] ZeroInterval {
        key: String,
    },

    #[error("Resource {key} is driven by an injected value")] Injected {
        key: String,
    },

    #[error(transparent)] Fetch(#[from] FetchError),
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")] Read {
        path: String,
        message: String,
    },

    #[error("Failed to parse config file '{path}': {message}")] Parse {
        path: String,
        message: String,
    },

    #[error("Invalid value for {field}: {message}")] Invalid {
        field: String,
        message: String,
    },

    #[error("Config already initialized")] AlreadyInitialized,

    #[error("Config not initialized. Call load_config() first.")] NotInitialized,
}

// =============================================================================
// CHART ERRORS
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Unknown timeframe: {0}")] UnknownTimeframe(String),
}
