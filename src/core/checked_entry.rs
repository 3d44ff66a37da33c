//! Admission record and terminal-action dispatch

use super::error::{LoggerError, Result};
use super::error_output::ErrorOutput;
use super::log_context::LogContext;
use super::log_entry::LogEntry;
use super::sink::Sink;
use std::sync::Arc;

/// Observes an admitted entry right after it is written.
pub trait TerminalHook: Send + Sync {
    fn on_write(&self, entry: &LogEntry, fields: &LogContext);
}

impl<F> TerminalHook for F
where
    F: Fn(&LogEntry, &LogContext) + Send + Sync,
{
    fn on_write(&self, entry: &LogEntry, fields: &LogContext) {
        self(entry, fields)
    }
}

/// What happens to the calling control flow after the write.
#[derive(Clone, Default)]
pub enum TerminalAction {
    /// Return to the caller normally.
    #[default]
    Noop,
    /// Panic with the entry's message.
    Panic,
    /// Terminate the process with exit code 1.
    Exit,
    /// Unwind the current task only. See [`TaskAbort`].
    AbortTask,
    /// Run a custom hook, then return normally.
    Custom(Arc<dyn TerminalHook>),
}

impl std::fmt::Debug for TerminalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalAction::Noop => write!(f, "Noop"),
            TerminalAction::Panic => write!(f, "Panic"),
            TerminalAction::Exit => write!(f, "Exit"),
            TerminalAction::AbortTask => write!(f, "AbortTask"),
            TerminalAction::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Panic payload used by [`TerminalAction::AbortTask`].
///
/// There is no direct way to stop only the current task, so the abort is
/// expressed as an unwind carrying this payload. [`catch_task_abort`] is
/// the boundary that absorbs it; an uncaught `TaskAbort` in a spawned
/// thread terminates only that thread.
#[derive(Debug, Clone, Copy)]
pub struct TaskAbort;

/// Run `f`, absorbing a [`TaskAbort`] unwind.
///
/// Returns `None` when the closure was aborted, `Some` with its result
/// otherwise. Any other panic is propagated unchanged.
pub fn catch_task_abort<T>(f: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            if payload.is::<TaskAbort>() {
                None
            } else {
                std::panic::resume_unwind(payload)
            }
        }
    }
}

/// The outcome of checking one logging call.
///
/// Collects every sink that admitted the entry, the terminal action owed to
/// the caller, and the error output for reporting write failures. Writing
/// consumes the record, so an admitted entry is written at most once.
pub struct CheckedEntry {
    entry: LogEntry,
    sinks: Vec<Arc<dyn Sink>>,
    action: TerminalAction,
    error_output: Option<Arc<dyn ErrorOutput>>,
}

impl CheckedEntry {
    /// A record with no sinks, typically synthesized so a terminal action
    /// still runs when every sink declined the entry.
    pub fn new(entry: LogEntry) -> Self {
        Self {
            entry,
            sinks: Vec::new(),
            action: TerminalAction::Noop,
            error_output: None,
        }
    }

    /// Append `sink` to `record`, creating the record when none exists yet.
    pub fn add_sink(
        record: Option<CheckedEntry>,
        entry: &LogEntry,
        sink: Arc<dyn Sink>,
    ) -> CheckedEntry {
        let mut record = record.unwrap_or_else(|| CheckedEntry::new(entry.clone()));
        record.sinks.push(sink);
        record
    }

    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut LogEntry {
        &mut self.entry
    }

    /// Whether any sink admitted the entry.
    pub fn will_write(&self) -> bool {
        !self.sinks.is_empty()
    }

    pub fn terminal_action(&self) -> &TerminalAction {
        &self.action
    }

    #[must_use]
    pub fn with_terminal_action(mut self, action: TerminalAction) -> Self {
        self.action = action;
        self
    }

    pub fn set_error_output(&mut self, output: Arc<dyn ErrorOutput>) {
        self.error_output = Some(output);
    }

    /// Write the entry to every admitted sink, then dispatch the terminal
    /// action.
    ///
    /// The first write failure is the return value; later failures go to
    /// the error output so none is lost. When the terminal action does not
    /// return control (panic, exit, task abort), a pending failure is
    /// reported to the error output before dispatch.
    pub fn write(self, fields: LogContext) -> Result<()> {
        let mut first_err: Option<LoggerError> = None;
        for sink in &self.sinks {
            if let Err(err) = sink.write(&self.entry, &fields) {
                if first_err.is_none() {
                    first_err = Some(err);
                } else {
                    self.report_write_error(&err);
                }
            }
        }

        match self.action {
            TerminalAction::Noop => {}
            TerminalAction::Panic => {
                if let Some(err) = &first_err {
                    self.report_write_error(err);
                }
                panic!("{}", self.entry.message);
            }
            TerminalAction::Exit => {
                if let Some(err) = &first_err {
                    self.report_write_error(err);
                }
                std::process::exit(1);
            }
            TerminalAction::AbortTask => {
                if let Some(err) = &first_err {
                    self.report_write_error(err);
                }
                std::panic::panic_any(TaskAbort);
            }
            TerminalAction::Custom(ref hook) => {
                hook.on_write(&self.entry, &fields);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn report_write_error(&self, err: &LoggerError) {
        if let Some(output) = &self.error_output {
            output.report(&format!("{} write error: {}", self.entry.timestamp, err));
        }
    }
}

impl std::fmt::Debug for CheckedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckedEntry")
            .field("entry", &self.entry)
            .field("sinks", &self.sinks.len())
            .field("action", &self.action)
            .finish()
    }
}
