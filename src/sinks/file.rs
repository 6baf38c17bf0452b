//! File sink implementation

use crate::core::{PipelineError, Result, Sink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Drains the line stream to a file opened create-or-append.
///
/// Open failures are fatal at construction; the pipeline never silently
/// degrades to console-only.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
    name: String,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path.display().to_string();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::configuration(&name, e.to_string(), Some(e)))?;

        Ok(Self {
            writer: BufWriter::new(file),
            name,
        })
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| PipelineError::sink_write(&self.name, e.to_string()))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::sink_write(&self.name, e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_flush() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("sink.log");

        let mut sink = FileSink::new(&path).expect("open sink");
        sink.write_line("hello\n").unwrap();
        sink.write_line("world\n").unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[test]
    fn test_append_mode() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("append.log");
        fs::write(&path, "existing\n").unwrap();

        let mut sink = FileSink::new(&path).expect("open sink");
        sink.write_line("appended\n").unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing\nappended\n");
    }

    #[test]
    fn test_open_failure_is_configuration_error() {
        let err = FileSink::new("/no/such/directory/app.log").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration { .. }));
        assert!(err.to_string().contains("/no/such/directory/app.log"));
    }
}
