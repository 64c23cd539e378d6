//! Console styling for shell output.

use console::Style;

/// Prefix `msg` with a coloured status mark.
fn marked(mark: &str, colour: Style, msg: &str) -> String {
    format!("{} {}", colour.apply_to(mark), msg)
}

/// A command finished as asked.
pub fn success(msg: &str) -> String {
    marked("✓", Style::new().green(), msg)
}

/// A command failed; the shell keeps running.
pub fn error(msg: &str) -> String {
    marked("✗", Style::new().red().bold(), msg)
}

/// Cancelled actions, skipped rows and empty listings.
pub fn warn(msg: &str) -> String {
    marked("!", Style::new().yellow(), msg)
}

pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// Marker for a dry-run session (magenta).
pub fn dry_run_badge() -> String {
    Style::new().magenta().bold().apply_to("[dry run]").to_string()
}

/// Yes/no cell text for record flags.
pub fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        ""
    }
}
