//! Log record structure and wire-line rendering

use super::error::Result;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// The structured representation of one accepted log call.
///
/// Immutable once created. The timestamp is captured as a formatted string at
/// the moment the record is built, not when a sink eventually writes it.
/// Field order here is the key order of the JSON wire line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub level: LogLevel,
    pub prefix: String,
    pub message: String,
}

impl LogRecord {
    /// Escape characters that would break the one-line-per-record wire
    /// format. Also prevents log injection through caller-supplied text.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(
        level: LogLevel,
        prefix: impl Into<String>,
        message: String,
        timestamp_format: &TimestampFormat,
    ) -> Self {
        Self {
            timestamp: timestamp_format.now(),
            level,
            prefix: prefix.into(),
            message: Self::sanitize_message(&message),
        }
    }

    /// Serialize as a JSON object: `{"timestamp":...,"level":"INFO",...}`.
    ///
    /// The `level` value is the plain display name; color escapes never
    /// appear inside JSON output.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The plain-text wire line without its trailing newline:
    /// `<timestamp> <prefix> {LEVEL} <message>` with the braced level token
    /// colorized.
    pub fn to_text(&self) -> String {
        let level_token = format!("{{{}}}", self.level.to_str())
            .color(self.level.color_code())
            .to_string();
        format!(
            "{} {} {} {}",
            self.timestamp, self.prefix, level_token, self.message
        )
    }

    /// The exact serialized line delivered to every sink, including the
    /// single trailing newline.
    pub fn render(&self, json_mode: bool) -> Result<String> {
        let mut line = if json_mode {
            self.to_json()?
        } else {
            self.to_text()
        };
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord::new(
            level,
            "dxlog",
            message.to_string(),
            &TimestampFormat::Locale,
        )
    }

    #[test]
    fn test_message_sanitization() {
        let rec = record(LogLevel::Info, "line one\nline two\r\twith tab");
        assert!(!rec.message.contains('\n'));
        assert!(!rec.message.contains('\r'));
        assert!(!rec.message.contains('\t'));
        assert_eq!(rec.message, "line one\\nline two\\r\\twith tab");
    }

    #[test]
    fn test_json_wire_keys() {
        let rec = record(LogLevel::Warn, "disk almost full");
        let json: serde_json::Value = serde_json::from_str(&rec.to_json().unwrap()).unwrap();

        assert_eq!(json["level"], "WARN");
        assert_eq!(json["prefix"], "dxlog");
        assert_eq!(json["message"], "disk almost full");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_text_line_shape() {
        colored::control::set_override(false);
        let rec = record(LogLevel::Info, "test");
        let text = rec.to_text();
        assert!(text.contains("{INFO} test"), "got: {}", text);
        assert!(text.contains(" dxlog "));
    }

    #[test]
    fn test_rendered_line_has_single_trailing_newline() {
        let rec = record(LogLevel::Error, "boom");
        for json_mode in [false, true] {
            let line = rec.render(json_mode).unwrap();
            assert!(line.ends_with('\n'));
            assert!(!line.ends_with("\n\n"));
            assert_eq!(line.matches('\n').count(), 1);
        }
    }

    #[test]
    fn test_json_round_trip() {
        let rec = record(LogLevel::Debug, "payload \"quoted\"");
        let back: LogRecord = serde_json::from_str(&rec.to_json().unwrap()).unwrap();
        assert_eq!(back.level, LogLevel::Debug);
        assert_eq!(back.message, rec.message);
        assert_eq!(back.prefix, rec.prefix);
    }
}
