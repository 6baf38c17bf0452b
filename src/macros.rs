//! Logging macros for ergonomic call-site formatting.
//!
//! These macros are the format-string surface of the pipeline: a format
//! string plus arguments, interpolated with `format!` before the record is
//! built. Argument arity and conversions are checked at compile time.
//!
//! # Examples
//!
//! ```
//! use dxlog::prelude::*;
//! use dxlog::info;
//!
//! let pipeline = Pipeline::new();
//!
//! info!(pipeline, "Server started");
//!
//! let port = 8080;
//! info!(pipeline, "Listening on port {}", port);
//! ```

/// Log a message at an explicit level with automatic formatting.
///
/// # Examples
///
/// ```
/// # use dxlog::prelude::*;
/// # let pipeline = Pipeline::new();
/// use dxlog::log;
/// log!(pipeline, LogLevel::Info, "Simple message");
/// log!(pipeline, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($pipeline:expr, $level:expr, $($arg:tt)+) => {
        $pipeline.log($level, format!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// ```
/// # use dxlog::prelude::*;
/// # let pipeline = Pipeline::with_config(LogLevel::Debug, PipelineConfig::default()).unwrap();
/// use dxlog::debug;
/// debug!(pipeline, "Counter value: {}", 42);
/// ```
#[macro_export]
macro_rules! debug {
    ($pipeline:expr, $($arg:tt)+) => {
        $crate::log!($pipeline, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// ```
/// # use dxlog::prelude::*;
/// # let pipeline = Pipeline::new();
/// use dxlog::info;
/// info!(pipeline, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($pipeline:expr, $($arg:tt)+) => {
        $crate::log!($pipeline, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use dxlog::prelude::*;
/// # let pipeline = Pipeline::new();
/// use dxlog::warn;
/// warn!(pipeline, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($pipeline:expr, $($arg:tt)+) => {
        $crate::log!($pipeline, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use dxlog::prelude::*;
/// # let pipeline = Pipeline::new();
/// use dxlog::error;
/// error!(pipeline, "Code: {}, message: {}", 500, "internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($pipeline:expr, $($arg:tt)+) => {
        $crate::log!($pipeline, $crate::LogLevel::Error, $($arg)+)
    };
}
