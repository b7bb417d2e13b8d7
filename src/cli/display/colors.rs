//! Status color mapping for CLI output.
//!
//! `console` disables styling on its own when stdout is not a terminal or
//! `NO_COLOR` is set.

use console::{style, StyledObject};

/// Returns a colored string for workflow and influencer status values.
///
/// Color scheme:
/// - Green:  completed, active, agreed
/// - Yellow: counter_proposal, analyzing
/// - Blue:   contacted, negotiating
/// - Cyan:   product_selection, contract_pending, shipped
/// - Dim:    cancelled
pub fn colorize_status(status: &str) -> StyledObject<&str> {
    match status.to_lowercase().as_str() {
        "completed" | "active" | "agreed" => style(status).green().bold(),
        "counter_proposal" | "analyzing" => style(status).yellow(),
        "contacted" | "negotiating" => style(status).blue(),
        "product_selection" | "contract_pending" | "shipped" => style(status).cyan(),
        "cancelled" => style(status).dim(),
        _ => style(status).white(),
    }
}

/// Lock marker for field tables.
pub fn lock_marker(locked: bool) -> StyledObject<&'static str> {
    if locked {
        style("locked").red()
    } else {
        style("open").green()
    }
}

/// Notification result marker.
pub fn notification_marker(result: &str) -> StyledObject<&str> {
    match result {
        "sent" => style(result).green(),
        "failed" => style(result).red().bold(),
        _ => style(result).yellow(),
    }
}

/// Styled label for detail views (bold + dimmed colon).
pub fn label(name: &str) -> String {
    format!("{}{}", style(name).bold(), style(":").dim())
}

/// Section header with underline.
pub fn section_header(title: &str) -> String {
    format!("\n{}", style(title).bold().underlined())
}
