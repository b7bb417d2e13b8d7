//! ID, time, money and truncation formatters for CLI output.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Return first 8 chars of a UUID string for list display.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` UTC.
pub fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Format an optional price without trailing zeros, or "-".
pub fn price(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |p| p.normalize().to_string())
}

/// Truncate a string to a maximum number of characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Placeholder for absent optional values.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 10), "a longe...");
        assert_eq!(truncate("ação ação ação", 7), "ação...");
    }

    #[test]
    fn test_price() {
        assert_eq!(price(None), "-");
        assert_eq!(price(Some(Decimal::new(15000, 2))), "150");
        assert_eq!(price(Some(Decimal::new(9950, 2))), "99.5");
    }
}
