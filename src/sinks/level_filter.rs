//! Raise a sink's admission threshold

use crate::core::{
    CheckedEntry, LevelEnabler, LogContext, LogEntry, LogLevel, LoggerError, Result, Sink,
};
use std::sync::Arc;

/// Wraps a sink with a stricter admission threshold.
///
/// Raising can only tighten admission: construction fails when the raised
/// threshold enables a level the wrapped sink rejects, since that would
/// loosen filtering instead.
pub struct IncreaseLevelSink {
    inner: Arc<dyn Sink>,
    level: Arc<dyn LevelEnabler>,
}

impl IncreaseLevelSink {
    pub fn new(inner: Arc<dyn Sink>, level: Arc<dyn LevelEnabler>) -> Result<Arc<Self>> {
        for candidate in LogLevel::ALL.iter().rev() {
            if !inner.enabled(*candidate) && level.enabled(*candidate) {
                return Err(LoggerError::config(
                    "IncreaseLevelSink",
                    format!(
                        "level {} is allowed by the raised threshold but not by the wrapped sink",
                        candidate
                    ),
                ));
            }
        }
        Ok(Arc::new(Self { inner, level }))
    }
}

impl Sink for IncreaseLevelSink {
    fn enabled(&self, level: LogLevel) -> bool {
        self.level.enabled(level)
    }

    fn check(
        self: Arc<Self>,
        entry: &LogEntry,
        record: Option<CheckedEntry>,
    ) -> Option<CheckedEntry> {
        // The wrapped sink registers itself; the filter only gates.
        if !self.enabled(entry.level) {
            return record;
        }
        Arc::clone(&self.inner).check(entry, record)
    }

    fn with_fields(self: Arc<Self>, fields: LogContext) -> Arc<dyn Sink> {
        Arc::new(IncreaseLevelSink {
            inner: Arc::clone(&self.inner).with_fields(fields),
            level: Arc::clone(&self.level),
        })
    }

    fn write(&self, entry: &LogEntry, fields: &LogContext) -> Result<()> {
        self.inner.write(entry, fields)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}
