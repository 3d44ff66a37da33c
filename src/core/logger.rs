//! Immutable logger snapshots and the admission pipeline

use super::checked_entry::{CheckedEntry, TerminalAction};
use super::clock::{Clock, SystemClock};
use super::error::LoggerError;
use super::error_output::{ErrorOutput, StderrOutput};
use super::log_context::LogContext;
use super::log_entry::{EntryCaller, LogEntry};
use super::log_level::{LevelEnabler, LogLevel};
use super::sink::{NopSink, Sink};
use super::stacktrace::{BacktraceCapturer, StackCapturer, StackDepth};
use chrono::{DateTime, Utc};
use std::sync::Arc;

// Frames between the user's call site and the capture point: the public
// logging method plus check_inner. Public methods must therefore call
// check_inner directly, never through another internal hop.
const CALLER_SKIP_OFFSET: usize = 2;

/// An immutable logging configuration.
///
/// Every derivation method (`with`, `named`, `with_options`) returns a new
/// snapshot and leaves the receiver untouched, so a snapshot can be shared
/// freely across threads. All configuration is fixed at construction; the
/// per-call work is deciding admission and writing.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::new(Arc::new(NopSink));
/// let request_logger = logger
///     .named("api")
///     .with(LogContext::new().with_field("request_id", "abc-123"));
///
/// request_logger.info("request accepted");
/// ```
#[derive(Clone)]
pub struct Logger {
    pub(crate) sink: Arc<dyn Sink>,
    pub(crate) name: String,
    pub(crate) development: bool,
    pub(crate) add_caller: bool,
    pub(crate) add_stack: Option<Arc<dyn LevelEnabler>>,
    pub(crate) caller_skip: isize,
    pub(crate) on_fatal: TerminalAction,
    pub(crate) error_output: Arc<dyn ErrorOutput>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) capturer: Arc<dyn StackCapturer>,
}

impl Logger {
    /// Create a logger writing to `sink` with default configuration.
    #[must_use]
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink,
            name: String::new(),
            development: false,
            add_caller: false,
            add_stack: None,
            caller_skip: 0,
            on_fatal: TerminalAction::Noop,
            error_output: Arc::new(StderrOutput),
            clock: Arc::new(SystemClock),
            capturer: Arc::new(BacktraceCapturer),
        }
    }

    /// A logger that never writes anything. Useful as a drop-in default.
    #[must_use]
    pub fn nop() -> Self {
        Self::new(Arc::new(NopSink))
    }

    /// The sink this snapshot writes to.
    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// The accumulated dot-joined name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derive a snapshot with `options` applied in order.
    #[must_use]
    pub fn with_options<I>(&self, options: I) -> Logger
    where
        I: IntoIterator<Item = super::options::LoggerOption>,
    {
        let mut child = self.clone();
        for option in options {
            option.apply(&mut child);
        }
        child
    }

    /// Derive a snapshot whose sink carries additional accumulated fields.
    ///
    /// Field accumulation is the sink's concern: the child holds a new
    /// sink reference from [`Sink::with_fields`] and the receiver keeps
    /// the old one. Later additions and call-site fields win on key
    /// conflicts.
    #[must_use]
    pub fn with(&self, fields: LogContext) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }
        let mut child = self.clone();
        child.sink = Arc::clone(&self.sink).with_fields(fields);
        child
    }

    /// Derive a snapshot whose name has `name` appended with a dot.
    ///
    /// An empty `name` yields a configuration-identical snapshot.
    #[must_use]
    pub fn named(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        let mut child = self.clone();
        if child.name.is_empty() {
            child.name = name.to_string();
        } else {
            child.name = format!("{}.{}", child.name, name);
        }
        child
    }

    /// Run the admission pipeline for a prospective entry.
    ///
    /// Returns `None` when nothing needs to happen. A returned record may
    /// still have `will_write() == false` when it exists only to carry a
    /// terminal action; callers must invoke
    /// [`write`](CheckedEntry::write) on every returned record.
    #[must_use]
    pub fn check(&self, level: LogLevel, message: impl Into<String>) -> Option<CheckedEntry> {
        self.check_inner(level, message.into())
    }

    /// Log at an arbitrary level.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let record = self.check_inner(level, message.into());
        self.finish(record, LogContext::new());
    }

    /// Log at an arbitrary level with call-site fields.
    pub fn log_with(&self, level: LogLevel, message: impl Into<String>, fields: LogContext) {
        let record = self.check_inner(level, message.into());
        self.finish(record, fields);
    }

    pub fn debug(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::Debug, message.into());
        self.finish(record, LogContext::new());
    }

    pub fn info(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::Info, message.into());
        self.finish(record, LogContext::new());
    }

    pub fn warn(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::Warn, message.into());
        self.finish(record, LogContext::new());
    }

    pub fn error(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::Error, message.into());
        self.finish(record, LogContext::new());
    }

    /// Log at `DPanic`. Panics after the write when the snapshot is in
    /// development mode.
    pub fn dpanic(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::DPanic, message.into());
        self.finish(record, LogContext::new());
    }

    /// Log at `Panic`, then panic with the message.
    pub fn panic(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::Panic, message.into());
        self.finish(record, LogContext::new());
    }

    /// Log at `Fatal`, then run the configured fatal action. Without an
    /// override this terminates the process.
    pub fn fatal(&self, message: impl Into<String>) {
        let record = self.check_inner(LogLevel::Fatal, message.into());
        self.finish(record, LogContext::new());
    }

    /// Flush the sink.
    pub fn sync(&self) -> super::error::Result<()> {
        self.sink.sync()
    }

    fn finish(&self, record: Option<CheckedEntry>, fields: LogContext) {
        if let Some(record) = record {
            let timestamp = record.entry().timestamp;
            if let Err(err) = record.write(fields) {
                self.error_output
                    .report(&format!("{} write error: {}", timestamp, err));
            }
        }
    }

    fn check_inner(&self, level: LogLevel, message: String) -> Option<CheckedEntry> {
        // Disabled non-terminal levels bail before building an entry.
        // Terminal levels continue: their action runs even when every
        // sink declines.
        if !level.is_terminal() && !self.sink.enabled(level) {
            return None;
        }

        let entry = LogEntry::new(level, message)
            .at(self.clock.now())
            .named(self.name.clone());

        let record = Arc::clone(&self.sink).check(&entry, None);
        let will_write = record.is_some();

        let record = match level {
            LogLevel::Panic => {
                Some(Self::ensure(record, &entry).with_terminal_action(TerminalAction::Panic))
            }
            LogLevel::Fatal => {
                // A missing or no-op fatal override would let execution
                // continue past a fatal call, so it is replaced with a
                // real exit.
                let action = match &self.on_fatal {
                    TerminalAction::Noop => TerminalAction::Exit,
                    other => other.clone(),
                };
                Some(Self::ensure(record, &entry).with_terminal_action(action))
            }
            LogLevel::DPanic if self.development => {
                Some(Self::ensure(record, &entry).with_terminal_action(TerminalAction::Panic))
            }
            _ => record,
        };

        // Records that exist only for their terminal action skip the
        // annotation work below.
        if !will_write {
            return record;
        }
        let mut record = record?;

        record.set_error_output(Arc::clone(&self.error_output));

        let add_stack = self
            .add_stack
            .as_ref()
            .is_some_and(|enabler| enabler.enabled(level));
        if !self.add_caller && !add_stack {
            return Some(record);
        }

        // Caller and stack share one capture.
        let depth = if add_stack {
            StackDepth::Full
        } else {
            StackDepth::First
        };
        let skip = self
            .caller_skip
            .saturating_add(CALLER_SKIP_OFFSET as isize)
            .max(0) as usize;
        let session = self.capturer.capture(skip, depth);

        if session.is_empty() {
            if self.add_caller {
                self.report_check_error(record.entry().timestamp, &LoggerError::CallerUnavailable);
            }
            return Some(record);
        }

        if self.add_caller {
            if let Some(frame) = session.caller() {
                record.entry_mut().caller = Some(
                    EntryCaller::new(frame.pc, frame.file.clone(), frame.line)
                        .with_function(frame.function.clone()),
                );
            }
        }
        if add_stack {
            record.entry_mut().stack = Some(session.format());
        }

        Some(record)
    }

    fn ensure(record: Option<CheckedEntry>, entry: &LogEntry) -> CheckedEntry {
        record.unwrap_or_else(|| CheckedEntry::new(entry.clone()))
    }

    fn report_check_error(&self, timestamp: DateTime<Utc>, err: &LoggerError) {
        self.error_output
            .report(&format!("{} Logger::check error: {}", timestamp, err));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::nop()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("development", &self.development)
            .field("add_caller", &self.add_caller)
            .field("caller_skip", &self.caller_skip)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::core::stacktrace::{Frame, StackSession};
    use parking_lot::Mutex;

    struct SpySink {
        threshold: LogLevel,
        entries: Arc<Mutex<Vec<LogEntry>>>,
        fields: Arc<Mutex<Vec<LogContext>>>,
        defaults: LogContext,
    }

    impl SpySink {
        fn new(threshold: LogLevel) -> Arc<Self> {
            Arc::new(Self {
                threshold,
                entries: Arc::new(Mutex::new(Vec::new())),
                fields: Arc::new(Mutex::new(Vec::new())),
                defaults: LogContext::new(),
            })
        }
    }

    impl Sink for SpySink {
        fn enabled(&self, level: LogLevel) -> bool {
            self.threshold.enabled(level)
        }

        fn check(
            self: Arc<Self>,
            entry: &LogEntry,
            record: Option<CheckedEntry>,
        ) -> Option<CheckedEntry> {
            if self.enabled(entry.level) {
                Some(CheckedEntry::add_sink(record, entry, self))
            } else {
                record
            }
        }

        fn with_fields(self: Arc<Self>, fields: LogContext) -> Arc<dyn Sink> {
            let mut defaults = self.defaults.clone();
            defaults.extend(&fields);
            Arc::new(SpySink {
                threshold: self.threshold,
                entries: Arc::clone(&self.entries),
                fields: Arc::clone(&self.fields),
                defaults,
            })
        }

        fn write(&self, entry: &LogEntry, fields: &LogContext) -> Result<()> {
            let mut merged = fields.clone();
            merged.merge_defaults(&self.defaults);
            self.entries.lock().push(entry.clone());
            self.fields.lock().push(merged);
            Ok(())
        }

        fn sync(&self) -> Result<()> {
            Ok(())
        }
    }

    struct SpyErrorOutput {
        lines: Mutex<Vec<String>>,
    }

    impl SpyErrorOutput {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                lines: Mutex::new(Vec::new()),
            })
        }
    }

    impl ErrorOutput for SpyErrorOutput {
        fn report(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }
    }

    struct FixedCapturer {
        frames: Vec<Frame>,
    }

    impl StackCapturer for FixedCapturer {
        fn capture(&self, _skip: usize, depth: StackDepth) -> StackSession {
            let frames = match depth {
                StackDepth::First => self.frames.iter().take(1).cloned().collect(),
                StackDepth::Full => self.frames.clone(),
            };
            StackSession::new(frames)
        }
    }

    struct CountingCapturer {
        calls: Arc<Mutex<usize>>,
    }

    impl StackCapturer for CountingCapturer {
        fn capture(&self, _skip: usize, _depth: StackDepth) -> StackSession {
            *self.calls.lock() += 1;
            StackSession::new(vec![frame("app::f", "src/f.rs", 1)])
        }
    }

    fn frame(function: &str, file: &str, line: u32) -> Frame {
        Frame {
            pc: 0x1000,
            function: function.to_string(),
            file: file.to_string(),
            line,
        }
    }

    #[test]
    fn test_disabled_level_is_not_admitted() {
        let sink = SpySink::new(LogLevel::Warn);
        let logger = Logger::new(sink.clone());

        assert!(logger.check(LogLevel::Info, "quiet").is_none());
        logger.info("quiet");
        assert!(sink.entries.lock().is_empty());
    }

    #[test]
    fn test_enabled_level_writes() {
        let sink = SpySink::new(LogLevel::Debug);
        let logger = Logger::new(sink.clone());

        logger.warn("written");
        let entries = sink.entries.lock();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].message, "written");
    }

    #[test]
    fn test_declined_fatal_still_carries_action() {
        let logger = Logger::nop();

        let record = logger.check(LogLevel::Fatal, "going down").unwrap();
        assert!(!record.will_write());
        assert!(matches!(record.terminal_action(), TerminalAction::Exit));
    }

    #[test]
    fn test_fatal_override_is_honored_unless_noop() {
        let mut logger = Logger::nop();
        logger.on_fatal = TerminalAction::AbortTask;
        let record = logger.check(LogLevel::Fatal, "down").unwrap();
        assert!(matches!(record.terminal_action(), TerminalAction::AbortTask));

        logger.on_fatal = TerminalAction::Noop;
        let record = logger.check(LogLevel::Fatal, "down").unwrap();
        assert!(matches!(record.terminal_action(), TerminalAction::Exit));
    }

    #[test]
    fn test_dpanic_only_panics_in_development() {
        let sink = SpySink::new(LogLevel::Debug);
        let logger = Logger::new(sink);

        let record = logger.check(LogLevel::DPanic, "odd state").unwrap();
        assert!(matches!(record.terminal_action(), TerminalAction::Noop));

        let mut dev = logger.clone();
        dev.development = true;
        let record = dev.check(LogLevel::DPanic, "odd state").unwrap();
        assert!(matches!(record.terminal_action(), TerminalAction::Panic));
    }

    #[test]
    fn test_with_is_snapshot_isolated() {
        let sink = SpySink::new(LogLevel::Debug);
        let parent = Logger::new(sink.clone());
        let child = parent.with(LogContext::new().with_field("request_id", "r1"));

        parent.info("from parent");
        child.info("from child");

        let fields = sink.fields.lock();
        assert!(fields[0].is_empty());
        assert!(fields[1].fields().contains_key("request_id"));
    }

    #[test]
    fn test_call_site_fields_override_snapshot_fields() {
        let sink = SpySink::new(LogLevel::Debug);
        let logger =
            Logger::new(sink.clone()).with(LogContext::new().with_field("source", "snapshot"));

        logger.log_with(
            LogLevel::Info,
            "msg",
            LogContext::new().with_field("source", "call site"),
        );

        let fields = sink.fields.lock();
        assert_eq!(
            fields[0].fields().get("source"),
            Some(&crate::core::log_context::FieldValue::String(
                "call site".to_string()
            ))
        );
    }

    #[test]
    fn test_named_joins_with_dots() {
        let logger = Logger::nop();
        let named = logger.named("api").named("auth");
        assert_eq!(named.name(), "api.auth");

        let unchanged = named.named("");
        assert_eq!(unchanged.name(), "api.auth");
    }

    #[test]
    fn test_caller_annotation_uses_capturer() {
        let sink = SpySink::new(LogLevel::Debug);
        let mut logger = Logger::new(sink.clone());
        logger.add_caller = true;
        logger.capturer = Arc::new(FixedCapturer {
            frames: vec![frame("app::handle", "src/handle.rs", 21)],
        });

        logger.info("with caller");
        let entries = sink.entries.lock();
        let caller = entries[0].caller.as_ref().unwrap();
        assert_eq!(caller.file, "src/handle.rs");
        assert_eq!(caller.line, 21);
    }

    #[test]
    fn test_disabled_level_never_captures() {
        let calls = Arc::new(Mutex::new(0));
        let mut logger = Logger::new(SpySink::new(LogLevel::Warn));
        logger.add_caller = true;
        logger.capturer = Arc::new(CountingCapturer {
            calls: Arc::clone(&calls),
        });

        logger.debug("filtered");
        logger.info("filtered");
        assert_eq!(*calls.lock(), 0);

        logger.error("admitted");
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_failed_caller_capture_is_reported() {
        let sink = SpySink::new(LogLevel::Debug);
        let errors = SpyErrorOutput::new();
        let mut logger = Logger::new(sink.clone());
        logger.add_caller = true;
        logger.error_output = errors.clone();
        logger.capturer = Arc::new(FixedCapturer { frames: vec![] });

        logger.info("no caller");

        let entries = sink.entries.lock();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].caller.is_none());

        let lines = errors.lines.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("failed to get caller"));
    }

    #[test]
    fn test_stack_annotation_formats_all_frames() {
        let sink = SpySink::new(LogLevel::Debug);
        let mut logger = Logger::new(sink.clone());
        logger.add_stack = Some(Arc::new(LogLevel::Warn));
        logger.capturer = Arc::new(FixedCapturer {
            frames: vec![
                frame("app::handle", "src/handle.rs", 21),
                frame("app::main", "src/main.rs", 5),
            ],
        });

        logger.info("below stack threshold");
        logger.error("above stack threshold");

        let entries = sink.entries.lock();
        assert!(entries[0].stack.is_none());
        let stack = entries[1].stack.as_ref().unwrap();
        assert!(stack.contains("app::handle"));
        assert!(stack.contains("src/main.rs:5"));
    }

    #[test]
    fn test_injected_clock_stamps_entries() {
        use crate::core::clock::FixedClock;
        use chrono::TimeZone;

        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let sink = SpySink::new(LogLevel::Debug);
        let mut logger = Logger::new(sink.clone());
        logger.clock = Arc::new(FixedClock(instant));

        logger.info("timed");
        assert_eq!(sink.entries.lock()[0].timestamp, instant);
    }
}
