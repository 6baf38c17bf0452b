//! Error types for the logging pipeline
//!
//! Construction-time errors propagate to the caller synchronously; runtime
//! delivery errors never propagate to a logging call site. Gated calls are
//! not errors at all.

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A destination could not be opened at construction time. Fatal: the
    /// pipeline is not created and never silently degrades to console-only.
    #[error("Cannot open log destination '{path}': {message}")]
    Configuration {
        path: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A runtime I/O failure on one sink. Isolated to that sink and reported
    /// through the out-of-band error channel.
    #[error("Sink '{sink}' write failed: {message}")]
    SinkWrite { sink: String, message: String },

    /// A sink's delivery queue stayed full and a line was dropped for it.
    /// Reported through the out-of-band error channel alongside the overflow
    /// alert.
    #[error("Delivery queue full for sink '{sink}'")]
    QueueFull { sink: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a configuration error for an unreachable destination path.
    pub fn configuration(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        PipelineError::Configuration {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink write error.
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error.
    pub fn queue_full(sink: impl Into<String>) -> Self {
        PipelineError::QueueFull { sink: sink.into() }
    }
}
