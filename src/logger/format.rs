//! Log formatting and console output with ANSI colors and text wrapping

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 8;
const LEVEL_WIDTH: usize = 7;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();

    let base_line = format!(
        "{} [{}] [{}] ",
        time.dimmed(),
        format_tag(&tag),
        format_level(level)
    );
    let prefix_width = time.len() + TAG_WIDTH + LEVEL_WIDTH + 7;
    let available_space = MAX_LINE_LENGTH.saturating_sub(prefix_width).max(50);

    let chunks = wrap_text(message, available_space);
    print_stdout_safe(&format!("{}{}", base_line, chunks[0]));

    let continuation_prefix = " ".repeat(prefix_width);
    for chunk in &chunks[1..] {
        print_stdout_safe(&format!("{}{}", continuation_prefix, chunk));
    }
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Cache => label.bright_cyan().bold(),
        LogTag::Fetch => label.bright_blue().bold(),
        LogTag::Charts => label.bright_green().bold(),
        LogTag::Overlay => label.bright_magenta().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow(),
        LogLevel::Info => label.normal(),
        LogLevel::Debug => label.bright_black(),
        LogLevel::Verbose => label.dimmed(),
    }
}

/// Wrap text at word boundaries; always returns at least one chunk
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Print to stdout, ignoring broken pipes (e.g. `marketdash watch | head`)
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("{}", line);
        }
    }
}
