//! Timestamp wire format shared by the store, the binder, and the handlers.
//!
//! Timestamps cross the wire as `YYYY-MM-DD HH:MM:SS`; a bare date is
//! accepted on input and means midnight of that day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp in the wire format.
#[must_use]
pub fn format(ts: DateTime<Utc>) -> String {
    ts.format(FORMAT).to_string()
}

/// Parse a wire-format timestamp, falling back to a bare `YYYY-MM-DD` date.
#[must_use]
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let ts = parse("2024-05-01 12:30:00").unwrap();
        assert_eq!(format(ts), "2024-05-01 12:30:00");
    }

    #[test]
    fn date_only_fallback() {
        let ts = parse("2024-05-01").unwrap();
        assert_eq!(format(ts), "2024-05-01 00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
