//! Log level definitions

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity tag on a log call.
///
/// Numeric ordering is `None(0) < Error(1) < Warn(2) < Info(3) < Debug(4)`.
/// A call at level `L` is accepted iff `L <= allowed_level`, so raising the
/// allowed level makes the pipeline chattier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Default)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    /// All levels in numeric order, matching the display name table.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::None,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Color of the braced level token in text-mode output.
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::None => White,
            LogLevel::Error => Red,
            LogLevel::Warn => Yellow,
            LogLevel::Info => Blue,
            LogLevel::Debug => Magenta,
        }
    }

    /// Whether a call at this level passes the configured threshold.
    #[inline]
    pub fn is_allowed_by(&self, allowed: LogLevel) -> bool {
        *self <= allowed
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(LogLevel::None),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

// The display name is part of the JSON wire contract ("INFO", not "Info"),
// so serde goes through the name table rather than the variant names.
impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl Visitor<'_> for LevelVisitor {
            type Value = LogLevel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a log level name such as \"INFO\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<LogLevel, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(LevelVisitor)
    }
}
