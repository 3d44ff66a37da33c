//! Write-observer wrapper around another sink

use crate::core::{CheckedEntry, LogContext, LogEntry, LogLevel, Result, Sink};
use std::sync::Arc;

/// Observes every entry the wrapped sink admits.
pub type WriteHook = Arc<dyn Fn(&LogEntry) -> Result<()> + Send + Sync>;

/// Runs a set of hooks alongside the wrapped sink's own write.
///
/// The wrapper registers itself on the admission record in addition to the
/// wrapped sink, so its write call runs only the hooks.
pub struct HookedSink {
    inner: Arc<dyn Sink>,
    hooks: Vec<WriteHook>,
}

impl HookedSink {
    pub fn new(inner: Arc<dyn Sink>, hooks: Vec<WriteHook>) -> Self {
        Self { inner, hooks }
    }
}

impl Sink for HookedSink {
    fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    fn check(
        self: Arc<Self>,
        entry: &LogEntry,
        record: Option<CheckedEntry>,
    ) -> Option<CheckedEntry> {
        // The wrapped sink decides admission and registers itself; the
        // wrapper joins any record that exists afterwards.
        match Arc::clone(&self.inner).check(entry, record) {
            Some(downstream) => Some(CheckedEntry::add_sink(Some(downstream), entry, self)),
            None => None,
        }
    }

    fn with_fields(self: Arc<Self>, fields: LogContext) -> Arc<dyn Sink> {
        Arc::new(HookedSink {
            inner: Arc::clone(&self.inner).with_fields(fields),
            hooks: self.hooks.clone(),
        })
    }

    fn write(&self, entry: &LogEntry, _fields: &LogContext) -> Result<()> {
        let mut first_err = None;
        for hook in &self.hooks {
            if let Err(err) = hook(entry) {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}
