use chrono::{DateTime, Duration, Utc};

/// Default lookback in seconds (3m30s). Exceeds the 3 minute cron interval so runs overlap.
pub const DEFAULT_LOOKBACK_SECS: i64 = 210;

/// Lower bound for the `occurred_after` filter: `now - lookback`.
///
/// Rendered as `YYYY-MM-DDTHH:MM:SS.ffffff` (naive UTC, microsecond precision).
pub fn occurred_after(now: DateTime<Utc>, lookback: Duration) -> String {
    format_bound(now - lookback)
}

/// Format a UTC instant the way the events endpoint expects it.
pub fn format_bound(at: DateTime<Utc>) -> String {
    at.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
