//! Timestamp formatting for log records
//!
//! Records carry their timestamp as an already-formatted string captured when
//! the record is built, so the format is fixed per pipeline.

use chrono::{DateTime, Local};

/// Timestamp format options for rendered records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Human-readable local wall clock: `2025-01-08 10:30:45`
    #[default]
    Locale,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123+09:00`
    Iso8601,

    /// RFC 3339 with timezone offset
    Rfc3339,

    /// Unix timestamp in seconds
    Unix,

    /// Custom strftime format string
    Custom(String),
}

impl TimestampFormat {
    /// Format a local datetime according to this format.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Locale => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Format the current wall-clock time.
    #[must_use]
    pub fn now(&self) -> String {
        self.format(&Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn test_locale_format() {
        let result = TimestampFormat::Locale.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08 10:30:45");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert!(result.starts_with("2025-01-08T10:30:45.000"));
    }

    #[test]
    fn test_unix_format() {
        let result = TimestampFormat::Unix.format(&fixed_datetime());
        let parsed: i64 = result.parse().expect("valid unix timestamp");
        assert!(parsed > 0);
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08 10:30");
    }

    #[test]
    fn test_default_is_locale() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Locale);
    }
}
