//! # dxlog
//!
//! A leveled logging pipeline: callers emit messages tagged with a severity,
//! the pipeline filters by a configured threshold, renders each record as a
//! colorized text line or a JSON object, and fans it out to one or more
//! destinations (console, files) with back-pressure-aware delivery.
//!
//! ## Features
//!
//! - **Level gating**: calls below the threshold are discarded before any
//!   rendering work happens
//! - **Multiple sinks**: console and file destinations, each draining the
//!   ordered line stream independently
//! - **Structured events**: subscribe to `LogRecord`s without re-parsing the
//!   byte stream
//! - **Non-blocking calls**: sink I/O happens on worker threads, never on the
//!   logging call path

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Destination, LogLevel, LogRecord, OverflowCallback, OverflowPolicy, Pipeline,
        PipelineBuilder, PipelineConfig, PipelineError, PipelineMetrics, RecordCallback, Result,
        Sink, SinkErrorCallback, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::sinks::{ConsoleSink, FileSink};
}

pub use crate::core::{
    Destination, LogLevel, LogRecord, OverflowCallback, OverflowPolicy, Pipeline, PipelineBuilder,
    PipelineConfig, PipelineError, PipelineMetrics, RecordCallback, Result, Sink,
    SinkErrorCallback, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use sinks::{ConsoleSink, FileSink};
