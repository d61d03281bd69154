//! Severity levels, most severe first
//!
//! The derived ordering is what threshold filtering compares against:
//! a message passes when its level is `<=` the configured minimum.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    /// Only for tags named with `--debug-<tag>`
    Debug,
    /// Only with `--verbose` or `--verbose-<tag>`
    Verbose,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Verbose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts level names in any case, plus `warn` and `trace` aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("warn") {
            return Ok(LogLevel::Warning);
        }
        if wanted.eq_ignore_ascii_case("trace") {
            return Ok(LogLevel::Verbose);
        }
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
