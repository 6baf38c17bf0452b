//! The log pipeline: level gating, rendering, and multi-sink fan-out
//!
//! One pipeline owns an immutable configuration and one bounded delivery
//! queue per sink. Log calls gate on the allowed level, render the record
//! once, then fan the serialized line out to every queue; dedicated worker
//! threads perform the actual I/O so callers never block on a sink.

use super::{
    config::{Destination, PipelineConfig},
    error::{PipelineError, Result},
    log_level::LogLevel,
    metrics::PipelineMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    record::LogRecord,
    sink::Sink,
};
use crate::sinks::{ConsoleSink, FileSink};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Timeout for draining sink queues when the pipeline is dropped or flushed.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handler invoked once per accepted log call with the structured record.
/// This is a side channel distinct from the serialized byte stream, so
/// consumers can subscribe to structured events without re-parsing lines.
pub type RecordCallback = Arc<dyn Fn(&LogRecord) + Send + Sync>;

/// Out-of-band channel for runtime delivery failures: write errors, invoked
/// from the failing sink's worker thread, and queue-overflow drops, invoked
/// from the logging caller. Delivery to other sinks is unaffected.
pub type SinkErrorCallback = Arc<dyn Fn(&PipelineError) + Send + Sync>;

enum SinkCommand {
    Line(Arc<str>),
    Flush(Sender<()>),
}

struct SinkHandle {
    name: String,
    sender: Option<Sender<SinkCommand>>,
    worker: Option<thread::JoinHandle<()>>,
}

pub struct Pipeline {
    allowed_level: LogLevel,
    config: PipelineConfig,
    sinks: Vec<SinkHandle>,
    subscribers: RwLock<Vec<RecordCallback>>,
    on_overflow: Option<OverflowCallback>,
    on_sink_error: Option<SinkErrorCallback>,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    /// Create a pipeline with all default options: allowed level INFO,
    /// prefix "dxlog", no file destinations, console enabled, text mode.
    ///
    /// # Panics
    ///
    /// The default configuration opens no file destinations, so the only
    /// remaining failure is spawning the console worker thread; this panics
    /// if the OS refuses to create it. Use [`Pipeline::with_config`] for a
    /// fallible construction path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LogLevel::Info, PipelineConfig::default())
            .expect("spawning the console worker thread failed")
    }

    /// Create a pipeline from an explicit level and configuration.
    ///
    /// Every file destination is opened before any worker starts; an
    /// unreachable path fails the whole construction with
    /// [`PipelineError::Configuration`] naming the offending path.
    pub fn with_config(allowed_level: LogLevel, config: PipelineConfig) -> Result<Self> {
        Self::build_parts(allowed_level, config, Vec::new(), Vec::new(), None, None)
    }

    /// Create a builder for a pipeline.
    ///
    /// # Example
    /// ```
    /// use dxlog::prelude::*;
    ///
    /// let pipeline = Pipeline::builder()
    ///     .allowed_level(LogLevel::Debug)
    ///     .prefix("api")
    ///     .console(true)
    ///     .build()
    ///     .unwrap();
    /// pipeline.debug("builder works");
    /// ```
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    fn build_parts(
        allowed_level: LogLevel,
        config: PipelineConfig,
        extra_sinks: Vec<Box<dyn Sink>>,
        subscribers: Vec<RecordCallback>,
        on_sink_error: Option<SinkErrorCallback>,
        on_overflow: Option<OverflowCallback>,
    ) -> Result<Self> {
        // Open every sink up front so a bad path aborts construction before
        // any worker thread exists.
        let mut opened: Vec<Box<dyn Sink>> = Vec::new();
        for destination in &config.destinations {
            match destination {
                Destination::File(path) => opened.push(Box::new(FileSink::new(path.clone())?)),
                Destination::Stdout => opened.push(Box::new(ConsoleSink::new())),
            }
        }
        if config.console_enabled {
            opened.push(Box::new(ConsoleSink::new()));
        }
        opened.extend(extra_sinks);

        let metrics = Arc::new(PipelineMetrics::new());
        let mut sinks = Vec::with_capacity(opened.len());
        for sink in opened {
            let name = sink.name().to_string();
            let (sender, receiver) = bounded(config.queue_capacity);
            let worker_metrics = Arc::clone(&metrics);
            let worker_on_error = on_sink_error.clone();
            let worker = thread::Builder::new()
                .name(format!("dxlog-{}", name))
                .spawn(move || drain_loop(sink, receiver, worker_metrics, worker_on_error))?;

            sinks.push(SinkHandle {
                name,
                sender: Some(sender),
                worker: Some(worker),
            });
        }

        Ok(Self {
            allowed_level,
            config,
            sinks,
            subscribers: RwLock::new(subscribers),
            on_overflow,
            on_sink_error,
            metrics,
        })
    }

    /// The configured level threshold.
    pub fn allowed_level(&self) -> LogLevel {
        self.allowed_level
    }

    /// The pipeline's immutable configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Metrics for pipeline observability.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Lines dropped so far, from queue overflow or degraded sinks.
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Register a structured-event handler, invoked once per accepted call.
    pub fn subscribe(&self, handler: RecordCallback) {
        self.subscribers.write().push(handler);
    }

    /// Emit a record at the given level.
    ///
    /// Gated calls return immediately with zero observable side effect: no
    /// record is built, nothing is queued, no subscriber fires. Never raises
    /// for a gated call or for normal emission, so logging is safe from any
    /// code path including error handlers.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !level.is_allowed_by(self.allowed_level) {
            return;
        }

        let record = LogRecord::new(
            level,
            self.config.prefix.as_str(),
            message.into(),
            &self.config.timestamp_format,
        );
        let line = match record.render(self.config.json_mode) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("[DXLOG ERROR] Failed to render record: {}", e);
                return;
            }
        };

        self.metrics.record_accepted();
        self.dispatch(Arc::from(line.as_str()));

        let subscribers = self.subscribers.read();
        for handler in subscribers.iter() {
            handler(&record);
        }
    }

    /// Fan the rendered line out to every sink queue. Each sink receives the
    /// same bytes; a full queue is handled per the configured overflow
    /// policy without touching the other sinks.
    fn dispatch(&self, line: Arc<str>) {
        for sink in &self.sinks {
            let Some(sender) = sink.sender.as_ref() else {
                continue;
            };
            let command = SinkCommand::Line(Arc::clone(&line));

            match &self.config.overflow_policy {
                OverflowPolicy::Block => {
                    // send() only fails when the worker is gone (shutdown)
                    let _ = sender.send(command);
                }
                OverflowPolicy::BlockWithTimeout(grace) => {
                    match sender.send_timeout(command, *grace) {
                        Ok(()) => {}
                        Err(SendTimeoutError::Timeout(_)) => self.overflow_drop(&sink.name),
                        Err(SendTimeoutError::Disconnected(_)) => {}
                    }
                }
                OverflowPolicy::DropNewest => {
                    if let Err(TrySendError::Full(_)) = sender.try_send(command) {
                        self.metrics.record_dropped();
                    }
                }
                OverflowPolicy::AlertAndDrop => {
                    if let Err(TrySendError::Full(_)) = sender.try_send(command) {
                        self.overflow_drop(&sink.name);
                    }
                }
            }
        }
    }

    fn overflow_drop(&self, sink_name: &str) {
        let dropped = self.metrics.record_dropped() + 1;

        // Alert on the first drop and periodically thereafter
        let should_alert = dropped == 1 || dropped.is_multiple_of(1000);
        if should_alert {
            eprintln!(
                "[DXLOG WARNING] Queue full for sink '{}', {} lines dropped. \
                 Consider a larger queue or a different overflow policy.",
                sink_name, dropped
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped);
            }
            if let Some(ref callback) = self.on_sink_error {
                callback(&PipelineError::queue_full(sink_name));
            }
        }
    }

    /// Synchronously drain every sink queue and flush the underlying
    /// writers. Returns once all sinks have acknowledged, so file contents
    /// are complete when this returns.
    pub fn flush(&self) -> Result<()> {
        for sink in &self.sinks {
            let Some(sender) = sink.sender.as_ref() else {
                continue;
            };
            let (ack_tx, ack_rx) = bounded(1);
            if sender.send(SinkCommand::Flush(ack_tx)).is_err() {
                continue;
            }
            ack_rx
                .recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
                .map_err(|_| PipelineError::sink_write(&sink.name, "flush timed out"))?;
        }
        Ok(())
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        // Close every queue first so workers drain whatever is pending and
        // exit on their own.
        for sink in &mut self.sinks {
            drop(sink.sender.take());
        }

        for sink in &mut self.sinks {
            if let Some(handle) = sink.worker.take() {
                let start = std::time::Instant::now();
                loop {
                    if handle.is_finished() {
                        if let Err(e) = handle.join() {
                            eprintln!(
                                "[DXLOG ERROR] Worker for sink '{}' panicked during shutdown: {:?}",
                                sink.name, e
                            );
                        }
                        break;
                    }
                    if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                        eprintln!(
                            "[DXLOG WARNING] Sink '{}' did not drain within {:?}. \
                             Some lines may be lost.",
                            sink.name, DEFAULT_SHUTDOWN_TIMEOUT
                        );
                        break;
                    }
                    thread::sleep(Duration::from_millis(10));
                }
            }
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[DXLOG WARNING] Pipeline shutting down with {} dropped lines (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Per-sink worker: pulls commands off the queue and performs the actual
/// I/O. A write failure degrades only this sink; it is reported once through
/// the error callback and later lines for it are discarded while the queue
/// keeps draining, so producers are never wedged by a dead sink.
fn drain_loop(
    mut sink: Box<dyn Sink>,
    receiver: Receiver<SinkCommand>,
    metrics: Arc<PipelineMetrics>,
    on_error: Option<SinkErrorCallback>,
) {
    let mut degraded = false;

    let handle = |command: SinkCommand, sink: &mut Box<dyn Sink>, degraded: &mut bool| -> bool {
        match command {
            SinkCommand::Line(line) => {
                if *degraded {
                    metrics.record_dropped();
                    return false;
                }
                match sink.write_line(&line) {
                    Ok(()) => {
                        metrics.record_written();
                        true
                    }
                    Err(e) => {
                        *degraded = true;
                        metrics.record_sink_error();
                        metrics.record_dropped();
                        report_sink_failure(sink.name(), &e, on_error.as_ref());
                        false
                    }
                }
            }
            SinkCommand::Flush(ack) => {
                if !*degraded {
                    if let Err(e) = sink.flush() {
                        *degraded = true;
                        metrics.record_sink_error();
                        report_sink_failure(sink.name(), &e, on_error.as_ref());
                    }
                }
                let _ = ack.send(());
                false
            }
        }
    };

    loop {
        let first = match receiver.recv() {
            Ok(command) => command,
            Err(_) => break, // pipeline dropped, queue is drained
        };

        let mut wrote = handle(first, &mut sink, &mut degraded);
        // Burst-drain whatever is immediately available before flushing once
        while let Ok(command) = receiver.try_recv() {
            wrote |= handle(command, &mut sink, &mut degraded);
        }

        if wrote && !degraded {
            if let Err(e) = sink.flush() {
                degraded = true;
                metrics.record_sink_error();
                report_sink_failure(sink.name(), &e, on_error.as_ref());
            }
        }
    }

    if !degraded {
        let _ = sink.flush();
    }
}

fn report_sink_failure(name: &str, error: &PipelineError, on_error: Option<&SinkErrorCallback>) {
    eprintln!(
        "[DXLOG ERROR] Sink '{}' failed and is now degraded: {}. \
         Other sinks continue to drain.",
        name, error
    );
    if let Some(callback) = on_error {
        callback(error);
    }
}

/// Builder for constructing a [`Pipeline`] with a fluent API.
///
/// # Example
/// ```no_run
/// use dxlog::prelude::*;
///
/// let pipeline = Pipeline::builder()
///     .allowed_level(LogLevel::Debug)
///     .prefix("worker")
///     .file("/var/log/worker.log")
///     .json(true)
///     .build()
///     .unwrap();
/// ```
pub struct PipelineBuilder {
    allowed_level: LogLevel,
    config: PipelineConfig,
    extra_sinks: Vec<Box<dyn Sink>>,
    subscribers: Vec<RecordCallback>,
    on_sink_error: Option<SinkErrorCallback>,
    on_overflow: Option<OverflowCallback>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            allowed_level: LogLevel::Info,
            config: PipelineConfig::default(),
            extra_sinks: Vec::new(),
            subscribers: Vec::new(),
            on_sink_error: None,
            on_overflow: None,
        }
    }

    /// Set the level threshold. Defaults to INFO.
    #[must_use = "builder methods return a new value"]
    pub fn allowed_level(mut self, level: LogLevel) -> Self {
        self.allowed_level = level;
        self
    }

    /// Set the record prefix.
    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config = self.config.with_prefix(prefix);
        self
    }

    /// Add a destination from any descriptor (`"stdout"` or a file path).
    #[must_use = "builder methods return a new value"]
    pub fn destination(mut self, destination: impl Into<Destination>) -> Self {
        self.config = self.config.with_destination(destination);
        self
    }

    /// Add a file destination.
    #[must_use = "builder methods return a new value"]
    pub fn file(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.destination(Destination::File(path.into()))
    }

    /// Enable or disable the console drain target. Defaults to enabled.
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config = self.config.with_console(enabled);
        self
    }

    /// Serialize records as JSON instead of colorized text.
    #[must_use = "builder methods return a new value"]
    pub fn json(mut self, json_mode: bool) -> Self {
        self.config = self.config.with_json(json_mode);
        self
    }

    /// Set the timestamp format captured into records.
    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: super::timestamp::TimestampFormat) -> Self {
        self.config = self.config.with_timestamp_format(format);
        self
    }

    /// Set the per-sink delivery queue bound.
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_queue_capacity(capacity);
        self
    }

    /// Set the overflow policy applied when a sink queue is full.
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config = self.config.with_overflow_policy(policy);
        self
    }

    /// Register a custom sink as an additional drain target. It receives
    /// the same ordered line stream as every configured destination.
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.extra_sinks.push(Box::new(sink));
        self
    }

    /// Register a structured-event handler invoked per accepted call.
    #[must_use = "builder methods return a new value"]
    pub fn on_record(mut self, handler: RecordCallback) -> Self {
        self.subscribers.push(handler);
        self
    }

    /// Register the out-of-band handler for runtime sink failures.
    #[must_use = "builder methods return a new value"]
    pub fn on_sink_error(mut self, handler: SinkErrorCallback) -> Self {
        self.on_sink_error = Some(handler);
        self
    }

    /// Register a callback for overflow drop alerts.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Build the pipeline, opening every destination.
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::build_parts(
            self.allowed_level,
            self.config,
            self.extra_sinks,
            self.subscribers,
            self.on_sink_error,
            self.on_overflow,
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn quiet_pipeline(level: LogLevel) -> Pipeline {
        Pipeline::builder()
            .allowed_level(level)
            .console(false)
            .build()
            .expect("no file destinations")
    }

    #[test]
    fn test_default_construction() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.allowed_level(), LogLevel::Info);
        assert_eq!(pipeline.config().prefix, "dxlog");
        assert!(pipeline.config().destinations.is_empty());
        assert!(pipeline.config().console_enabled);
        assert!(!pipeline.config().json_mode);
    }

    #[test]
    fn test_gated_call_fires_no_subscriber() {
        let fired = Arc::new(AtomicU64::new(0));
        let fired_clone = Arc::clone(&fired);
        let pipeline = Pipeline::builder()
            .allowed_level(LogLevel::Info)
            .console(false)
            .on_record(Arc::new(move |_| {
                fired_clone.fetch_add(1, Ordering::Relaxed);
            }))
            .build()
            .unwrap();

        pipeline.debug("below threshold");
        assert_eq!(fired.load(Ordering::Relaxed), 0);
        assert_eq!(pipeline.metrics().accepted_count(), 0);

        pipeline.info("at threshold");
        assert_eq!(fired.load(Ordering::Relaxed), 1);
        assert_eq!(pipeline.metrics().accepted_count(), 1);
    }

    #[test]
    fn test_subscriber_sees_structured_record() {
        let seen: Arc<parking_lot::Mutex<Vec<LogRecord>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let pipeline = Pipeline::builder()
            .allowed_level(LogLevel::Debug)
            .prefix("sub")
            .console(false)
            .on_record(Arc::new(move |record| {
                seen_clone.lock().push(record.clone());
            }))
            .build()
            .unwrap();

        pipeline.debug("my data");
        pipeline.error("bad thing");

        let records = seen.lock();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Debug);
        assert_eq!(records[0].message, "my data");
        assert_eq!(records[0].prefix, "sub");
        assert_eq!(records[1].level, LogLevel::Error);
    }

    #[test]
    fn test_runtime_subscription() {
        let fired = Arc::new(AtomicU64::new(0));
        let fired_clone = Arc::clone(&fired);

        let pipeline = quiet_pipeline(LogLevel::Info);
        pipeline.info("before subscription");
        pipeline.subscribe(Arc::new(move |_| {
            fired_clone.fetch_add(1, Ordering::Relaxed);
        }));
        pipeline.info("after subscription");

        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_level_wrappers_supply_constants() {
        let seen: Arc<parking_lot::Mutex<Vec<LogLevel>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let pipeline = Pipeline::builder()
            .allowed_level(LogLevel::Debug)
            .console(false)
            .on_record(Arc::new(move |record| {
                seen_clone.lock().push(record.level);
            }))
            .build()
            .unwrap();

        pipeline.error("e");
        pipeline.warn("w");
        pipeline.info("i");
        pipeline.debug("d");

        assert_eq!(
            *seen.lock(),
            vec![
                LogLevel::Error,
                LogLevel::Warn,
                LogLevel::Info,
                LogLevel::Debug
            ]
        );
    }

    #[test]
    fn test_bad_path_fails_construction() {
        let result = Pipeline::builder()
            .file("/no/such/directory/at/all/app.log")
            .build();
        let err = result.err().expect("construction must fail");
        assert!(matches!(err, PipelineError::Configuration { .. }));
        assert!(err.to_string().contains("/no/such/directory/at/all/app.log"));
    }

    #[test]
    fn test_none_threshold_gates_everything() {
        let pipeline = quiet_pipeline(LogLevel::None);
        pipeline.error("still gated");
        pipeline.info("also gated");
        assert_eq!(pipeline.metrics().accepted_count(), 0);
    }
}
