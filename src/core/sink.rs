//! Sink trait for log line destinations
//!
//! Sinks receive the exact rendered bytes, one line at a time. Rendering
//! happens once in the pipeline, so every sink sees the same serialized line.

use super::error::Result;

pub trait Sink: Send {
    /// Write one serialized line (trailing newline included).
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush buffered output to the underlying destination.
    fn flush(&mut self) -> Result<()>;

    /// Identifier used in error reports, e.g. the file path or "stdout".
    fn name(&self) -> &str;
}
