//! Pipeline configuration
//!
//! A `PipelineConfig` is a per-instance immutable value: defaults are built
//! fresh for every construction and caller overrides are applied with the
//! builder-style `with_*` methods. Nothing here is shared between pipelines.

use super::overflow_policy::OverflowPolicy;
use super::timestamp::TimestampFormat;
use std::path::{Path, PathBuf};

/// Default prefix stamped on every record.
pub const DEFAULT_PREFIX: &str = "dxlog";

/// Default bound of each per-sink delivery queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// The reserved destination string naming standard output.
pub const STDOUT_DESTINATION: &str = "stdout";

/// One drain target for the pipeline's serialized line stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output of the process.
    Stdout,
    /// A file opened create-or-append.
    File(PathBuf),
}

impl Destination {
    /// Parse a destination descriptor string. `"stdout"` is the console;
    /// anything else is a file path.
    pub fn parse(descriptor: &str) -> Self {
        if descriptor == STDOUT_DESTINATION {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(descriptor))
        }
    }
}

impl From<&str> for Destination {
    fn from(descriptor: &str) -> Self {
        Destination::parse(descriptor)
    }
}

impl From<&Path> for Destination {
    fn from(path: &Path) -> Self {
        Destination::File(path.to_path_buf())
    }
}

impl From<PathBuf> for Destination {
    fn from(path: PathBuf) -> Self {
        Destination::File(path)
    }
}

/// Configuration for one pipeline instance. Immutable after construction;
/// there is no runtime reconfiguration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Static label stamped into every record.
    pub prefix: String,
    /// File destinations registered as drain targets, in order.
    pub destinations: Vec<Destination>,
    /// Whether standard output is registered as an additional drain target.
    pub console_enabled: bool,
    /// Serialize records as JSON objects instead of colorized text lines.
    pub json_mode: bool,
    /// Timestamp format captured into each record.
    pub timestamp_format: TimestampFormat,
    /// Bound of each per-sink delivery queue.
    pub queue_capacity: usize,
    /// What to do when a sink's queue is full.
    pub overflow_policy: OverflowPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            destinations: Vec::new(),
            console_enabled: true,
            json_mode: false,
            timestamp_format: TimestampFormat::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with all default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Append one destination.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<Destination>) -> Self {
        self.destinations.push(destination.into());
        self
    }

    /// Replace the destination list.
    #[must_use]
    pub fn with_destinations<I, D>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Destination>,
    {
        self.destinations = destinations.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable the console drain target.
    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console_enabled = enabled;
        self
    }

    /// Switch between JSON and text wire format.
    #[must_use]
    pub fn with_json(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// Set the timestamp format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set the per-sink queue bound.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the overflow policy.
    #[must_use]
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.prefix, "dxlog");
        assert!(config.destinations.is_empty());
        assert!(config.console_enabled);
        assert!(!config.json_mode);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_defaults_are_per_instance() {
        let a = PipelineConfig::default().with_prefix("api");
        let b = PipelineConfig::default();
        assert_eq!(a.prefix, "api");
        assert_eq!(b.prefix, "dxlog");
    }

    #[test]
    fn test_destination_parse() {
        assert_eq!(Destination::parse("stdout"), Destination::Stdout);
        assert_eq!(
            Destination::parse("./write.log"),
            Destination::File(PathBuf::from("./write.log"))
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = PipelineConfig::new()
            .with_prefix("worker")
            .with_destination("/tmp/worker.log")
            .with_destination("stdout")
            .with_console(false)
            .with_json(true);

        assert_eq!(config.prefix, "worker");
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.destinations[1], Destination::Stdout);
        assert!(!config.console_enabled);
        assert!(config.json_mode);
        // untouched fields keep their defaults
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.timestamp_format, TimestampFormat::Locale);
    }
}
