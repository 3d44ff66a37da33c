//! Configuration options applied when deriving logger snapshots

use super::checked_entry::{TerminalAction, TerminalHook};
use super::clock::Clock;
use super::error_output::ErrorOutput;
use super::log_context::LogContext;
use super::log_entry::LogEntry;
use super::log_level::LevelEnabler;
use super::logger::Logger;
use super::sink::Sink;
use super::stacktrace::StackCapturer;
use crate::sinks::hooked::{HookedSink, WriteHook};
use crate::sinks::level_filter::IncreaseLevelSink;
use std::sync::Arc;

/// One configuration step.
///
/// Options are applied in the order given, so later options observe the
/// effects of earlier ones. Each constructor mirrors a single
/// configuration concern.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::new(Arc::new(NopSink)).with_options([
///     LoggerOption::add_caller(),
///     LoggerOption::add_stacktrace(LogLevel::Error),
///     LoggerOption::development(),
/// ]);
/// ```
pub struct LoggerOption {
    apply: Box<dyn Fn(&mut Logger) + Send + Sync>,
}

impl LoggerOption {
    /// Wrap an arbitrary configuration step.
    pub fn new(f: impl Fn(&mut Logger) + Send + Sync + 'static) -> Self {
        Self { apply: Box::new(f) }
    }

    pub(crate) fn apply(&self, logger: &mut Logger) {
        (self.apply)(logger)
    }

    /// Replace the snapshot's sink with a wrapped version of it.
    pub fn wrap_sink(
        f: impl Fn(Arc<dyn Sink>) -> Arc<dyn Sink> + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |logger| {
            logger.sink = f(Arc::clone(&logger.sink));
        })
    }

    /// Run `hooks` for every entry the sink admits.
    pub fn hooks(hooks: Vec<WriteHook>) -> Self {
        Self::wrap_sink(move |sink| Arc::new(HookedSink::new(sink, hooks.clone())))
    }

    /// Add accumulated fields to the snapshot's sink.
    pub fn fields(fields: LogContext) -> Self {
        Self::new(move |logger| {
            logger.sink = Arc::clone(&logger.sink).with_fields(fields.clone());
        })
    }

    /// Redirect internal-error reporting.
    pub fn error_output(output: Arc<dyn ErrorOutput>) -> Self {
        Self::new(move |logger| {
            logger.error_output = Arc::clone(&output);
        })
    }

    /// Put the snapshot in development mode: `DPanic` panics after the
    /// write.
    pub fn development() -> Self {
        Self::new(|logger| {
            logger.development = true;
        })
    }

    /// Annotate entries with their call site.
    pub fn add_caller() -> Self {
        Self::with_caller(true)
    }

    /// Enable or disable call-site annotation.
    pub fn with_caller(enabled: bool) -> Self {
        Self::new(move |logger| {
            logger.add_caller = enabled;
        })
    }

    /// Shift call-site resolution up the stack by `skip` frames.
    ///
    /// Additive: applying `add_caller_skip(1)` twice skips two frames.
    /// Meant for wrappers that interpose between user code and the logger.
    pub fn add_caller_skip(skip: isize) -> Self {
        Self::new(move |logger| {
            logger.caller_skip += skip;
        })
    }

    /// Attach a formatted stack trace to entries at levels `enabler`
    /// admits.
    pub fn add_stacktrace(enabler: impl LevelEnabler + 'static) -> Self {
        let enabler: Arc<dyn LevelEnabler> = Arc::new(enabler);
        Self::new(move |logger| {
            logger.add_stack = Some(Arc::clone(&enabler));
        })
    }

    /// Raise the sink's admission threshold to `enabler`.
    ///
    /// The raised threshold can only tighten admission. When it would
    /// enable a level the wrapped sink rejects, the option reports the
    /// failure to the snapshot's error output and leaves the sink
    /// unchanged.
    pub fn increase_level(enabler: impl LevelEnabler + 'static) -> Self {
        let enabler: Arc<dyn LevelEnabler> = Arc::new(enabler);
        Self::new(move |logger| {
            match IncreaseLevelSink::new(Arc::clone(&logger.sink), Arc::clone(&enabler)) {
                Ok(sink) => logger.sink = sink,
                Err(err) => {
                    logger
                        .error_output
                        .report(&format!("failed to increase level: {}", err));
                }
            }
        })
    }

    /// Override what happens after a `Fatal` write.
    ///
    /// A `Noop` override is replaced with a process exit at check time, so
    /// execution never continues silently past a fatal call.
    pub fn on_fatal(action: TerminalAction) -> Self {
        Self::new(move |logger| {
            logger.on_fatal = action.clone();
        })
    }

    /// Run `hook` after a `Fatal` write instead of exiting.
    pub fn with_fatal_hook(hook: Arc<dyn TerminalHook>) -> Self {
        Self::on_fatal(TerminalAction::Custom(hook))
    }

    /// Replace the entry timestamp source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(move |logger| {
            logger.clock = Arc::clone(&clock);
        })
    }

    /// Replace the call-site and stack capturer.
    pub fn with_stack_capturer(capturer: Arc<dyn StackCapturer>) -> Self {
        Self::new(move |logger| {
            logger.capturer = Arc::clone(&capturer);
        })
    }
}

impl std::fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoggerOption(..)")
    }
}

/// Convenience constructor for a write hook from a closure.
pub fn write_hook(
    f: impl Fn(&LogEntry) -> super::error::Result<()> + Send + Sync + 'static,
) -> WriteHook {
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checked_entry::CheckedEntry;
    use crate::core::error::Result;
    use crate::core::log_level::LogLevel;
    use parking_lot::Mutex;

    struct SpyErrorOutput {
        lines: Mutex<Vec<String>>,
    }

    impl ErrorOutput for SpyErrorOutput {
        fn report(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }
    }

    struct FieldSpySink {
        seen: Arc<Mutex<Vec<LogContext>>>,
        defaults: LogContext,
    }

    impl FieldSpySink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Arc::new(Mutex::new(Vec::new())),
                defaults: LogContext::new(),
            })
        }
    }

    impl Sink for FieldSpySink {
        fn enabled(&self, _level: LogLevel) -> bool {
            true
        }

        fn check(
            self: Arc<Self>,
            entry: &LogEntry,
            record: Option<CheckedEntry>,
        ) -> Option<CheckedEntry> {
            Some(CheckedEntry::add_sink(record, entry, self))
        }

        fn with_fields(self: Arc<Self>, fields: LogContext) -> Arc<dyn Sink> {
            let mut defaults = self.defaults.clone();
            defaults.extend(&fields);
            Arc::new(FieldSpySink {
                seen: Arc::clone(&self.seen),
                defaults,
            })
        }

        fn write(&self, _entry: &LogEntry, fields: &LogContext) -> Result<()> {
            let mut merged = fields.clone();
            merged.merge_defaults(&self.defaults);
            self.seen.lock().push(merged);
            Ok(())
        }

        fn sync(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_options_apply_in_order() {
        let logger = Logger::nop().with_options([
            LoggerOption::add_caller_skip(2),
            LoggerOption::add_caller_skip(-1),
            LoggerOption::development(),
        ]);

        assert_eq!(logger.caller_skip, 1);
        assert!(logger.development);
    }

    #[test]
    fn test_with_options_leaves_parent_untouched() {
        let parent = Logger::nop();
        let child = parent.with_options([LoggerOption::add_caller()]);

        assert!(!parent.add_caller);
        assert!(child.add_caller);
    }

    #[test]
    fn test_fields_option_accumulates() {
        let sink = FieldSpySink::new();
        let logger = Logger::new(sink.clone()).with_options([
            LoggerOption::fields(LogContext::new().with_field("service", "api")),
            LoggerOption::fields(LogContext::new().with_field("zone", "eu-1")),
        ]);

        logger.info("fields attached");

        let seen = sink.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 2);
        assert!(seen[0].fields().contains_key("service"));
        assert!(seen[0].fields().contains_key("zone"));
    }

    #[test]
    fn test_increase_level_failure_is_reported_not_fatal() {
        let errors = Arc::new(SpyErrorOutput {
            lines: Mutex::new(Vec::new()),
        });

        // The nop sink rejects everything, so any raise that admits a
        // level must fail and leave the sink in place.
        let logger = Logger::nop().with_options([
            LoggerOption::error_output(errors.clone()),
            LoggerOption::increase_level(LogLevel::Error),
        ]);

        assert!(!logger.sink().enabled(LogLevel::Error));
        let lines = errors.lines.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("failed to increase level"));
    }
}
