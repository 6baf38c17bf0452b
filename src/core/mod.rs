//! Core pipeline types and traits

pub mod config;
pub mod error;
pub mod log_level;
pub mod metrics;
pub mod overflow_policy;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod timestamp;

pub use config::{Destination, PipelineConfig, DEFAULT_PREFIX, DEFAULT_QUEUE_CAPACITY};
pub use error::{PipelineError, Result};
pub use log_level::LogLevel;
pub use metrics::PipelineMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy, DEFAULT_ENQUEUE_GRACE};
pub use pipeline::{
    Pipeline, PipelineBuilder, RecordCallback, SinkErrorCallback, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use record::LogRecord;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
