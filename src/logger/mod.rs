//! Tagged console logging
//!
//! Every line carries a [`LogTag`] naming the subsystem that wrote it.
//! Errors always print; `--quiet` keeps only errors, `--log-level` sets the
//! threshold, and debug lines for a tag appear only with `--debug-<tag>`.
//!
//! ```rust
//! use marketdash::logger::{self, LogTag};
//!
//! logger::init();
//! logger::info(LogTag::Cache, "Subscribed to /api/snapshot");
//! logger::debug(LogTag::Overlay, "NVDA: Idle -> ModalOpen");
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, init_from_args, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Reads logger flags from the stored process arguments. Call before logging.
pub fn init() {
    config::init_from_args();
}

/// Whether a message at `level` for `tag` would be printed
pub fn enabled(tag: LogTag, level: LogLevel) -> bool {
    core::should_log(&tag, level)
}

pub fn log(tag: LogTag, level: LogLevel, message: &str) {
    core::log_internal(tag, level, message);
}

pub fn error(tag: LogTag, message: &str) {
    log(tag, LogLevel::Error, message);
}

pub fn warning(tag: LogTag, message: &str) {
    log(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    log(tag, LogLevel::Info, message);
}

/// Printed only when `--debug-<tag>` names this tag
pub fn debug(tag: LogTag, message: &str) {
    log(tag, LogLevel::Debug, message);
}

pub fn verbose(tag: LogTag, message: &str) {
    log(tag, LogLevel::Verbose, message);
}
