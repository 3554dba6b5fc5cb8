//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables. The stable
//! diagnostic lines themselves are rendered uncolored by the diagnostics
//! crate; only banners and labels are styled here.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment. Call once at startup.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn file_path(path: &str) -> ColoredString {
    path.bold()
}

pub fn banner_ok(phase: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{} OK", phase).green().bold(),
        "===".dimmed()
    )
}

pub fn banner_fail(phase: &str, count: usize) -> String {
    let msg = if count == 1 {
        format!("{} FAILED: 1 error", phase)
    } else {
        format!("{} FAILED: {} errors", phase, count)
    };
    format!("{} {} {}", "===".dimmed(), msg.red().bold(), "===".dimmed())
}
