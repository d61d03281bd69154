/// Centralized argument handling
///
/// Stores the process arguments once so that the logger and the binary read
/// the same view, and so tests can override them.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        if let Some(value) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            return Some(value.to_string());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// Cache engine debug mode
pub fn is_debug_cache_enabled() -> bool {
    has_arg("--debug-cache")
}

/// Network fetch debug mode
pub fn is_debug_fetch_enabled() -> bool {
    has_arg("--debug-fetch")
}

/// Overlay controller debug mode
pub fn is_debug_overlay_enabled() -> bool {
    has_arg("--debug-overlay")
}

/// Whether an argument is consumed by the logger rather than the CLI parser
fn is_logger_flag(arg: &str) -> bool {
    matches!(arg, "--quiet" | "--verbose")
        || arg.starts_with("--debug-")
        || arg.starts_with("--verbose-")
        || arg.starts_with("--log-tags")
        || arg.starts_with("--log-level")
}

/// Arguments with logger flags removed, for handing to the CLI parser
pub fn without_logger_flags(args: &[String]) -> Vec<String> {
    let mut filtered = Vec::with_capacity(args.len());
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg == "--log-tags" || arg == "--log-level" {
            skip_value = true;
            continue;
        }
        if !is_logger_flag(arg) {
            filtered.push(arg.clone());
        }
    }
    filtered
}

/// Lists the debug flags currently enabled
pub fn enabled_debug_flags() -> Vec<String> {
    get_cmd_args()
        .into_iter()
        .filter(|a| a.starts_with("--debug-") || a.starts_with("--verbose"))
        .collect()
}
