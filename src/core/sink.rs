//! Output seam for admitted log entries

use super::checked_entry::CheckedEntry;
use super::error::Result;
use super::log_context::LogContext;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use std::sync::Arc;

/// Where admitted entries end up.
///
/// A sink decides admission per entry and receives the entry once, after
/// the admission record collected every participating sink. Implementations
/// must be safe to share across threads; `write` may be called concurrently.
pub trait Sink: Send + Sync {
    /// Whether entries at `level` can be admitted at all.
    fn enabled(&self, level: LogLevel) -> bool;

    /// Decide admission for `entry`.
    ///
    /// An admitting sink appends itself to `record`, creating the record
    /// when none exists yet. A declining sink returns `record` unchanged.
    /// The standard implementation is one line:
    ///
    /// ```ignore
    /// fn check(self: Arc<Self>, entry: &LogEntry, record: Option<CheckedEntry>) -> Option<CheckedEntry> {
    ///     if self.enabled(entry.level) {
    ///         Some(CheckedEntry::add_sink(record, entry, self))
    ///     } else {
    ///         record
    ///     }
    /// }
    /// ```
    fn check(
        self: Arc<Self>,
        entry: &LogEntry,
        record: Option<CheckedEntry>,
    ) -> Option<CheckedEntry>;

    /// A new sink carrying `fields` as accumulated defaults.
    ///
    /// The receiver is untouched; shared state such as an underlying
    /// writer stays shared between the two. At write time accumulated
    /// fields are layered under the call-site fields, so call sites win
    /// on key conflicts.
    fn with_fields(self: Arc<Self>, fields: LogContext) -> Arc<dyn Sink>;

    /// Write an admitted entry together with its merged fields.
    fn write(&self, entry: &LogEntry, fields: &LogContext) -> Result<()>;

    /// Flush buffered output.
    fn sync(&self) -> Result<()>;
}

/// A sink that is never enabled and writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopSink;

impl Sink for NopSink {
    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn check(
        self: Arc<Self>,
        _entry: &LogEntry,
        record: Option<CheckedEntry>,
    ) -> Option<CheckedEntry> {
        record
    }

    fn with_fields(self: Arc<Self>, _fields: LogContext) -> Arc<dyn Sink> {
        self
    }

    fn write(&self, _entry: &LogEntry, _fields: &LogContext) -> Result<()> {
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nop_sink_declines_everything() {
        let sink = Arc::new(NopSink);
        for level in LogLevel::ALL {
            assert!(!sink.enabled(level));
        }

        let entry = LogEntry::new(LogLevel::Fatal, "ignored".to_string());
        assert!(Arc::clone(&sink).check(&entry, None).is_none());
    }
}
