//! Console sink implementation

use crate::core::{Result, Sink};
use std::io::Write;

/// Drains the line stream to standard output.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
