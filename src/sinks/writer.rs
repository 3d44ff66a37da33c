//! Line-oriented sink over any `io::Write`

use crate::core::{
    CheckedEntry, LevelEnabler, LogContext, LogEntry, LogLevel, Result, Sink,
};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Output encoding for [`WriterSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriterFormat {
    /// Human-readable single lines.
    #[default]
    Text,
    /// One JSON object per line (JSONL). Compatible with log aggregation
    /// tools like ELK and Loki.
    Json,
}

/// Writes admitted entries as lines to a wrapped writer.
///
/// Fielded clones from [`Sink::with_fields`] share the writer and its
/// lock, so lines from every clone interleave without tearing.
pub struct WriterSink<W: Write + Send> {
    writer: Arc<Mutex<W>>,
    enabler: Arc<dyn LevelEnabler>,
    format: WriterFormat,
    fields: LogContext,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn text(writer: W, enabler: impl LevelEnabler + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            enabler: Arc::new(enabler),
            format: WriterFormat::Text,
            fields: LogContext::new(),
        }
    }

    pub fn json(writer: W, enabler: impl LevelEnabler + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            enabler: Arc::new(enabler),
            format: WriterFormat::Json,
            fields: LogContext::new(),
        }
    }

    fn format_text(entry: &LogEntry, fields: &LogContext) -> String {
        use std::fmt::Write as _;

        let mut line = String::new();
        let _ = write!(
            line,
            "[{}] [{:<6}]",
            entry.timestamp.to_rfc3339(),
            entry.level.to_str()
        );
        if !entry.logger_name.is_empty() {
            let _ = write!(line, " {}", entry.logger_name);
        }
        if let Some(caller) = &entry.caller {
            let _ = write!(line, " {}", caller.trimmed_path());
        }
        let _ = write!(line, " - {}", entry.message);
        if !fields.is_empty() {
            let _ = write!(line, " {}", fields.format_fields());
        }
        if let Some(stack) = &entry.stack {
            let _ = write!(line, "\n{}", stack);
        }
        line
    }

    fn format_json(entry: &LogEntry, fields: &LogContext) -> Result<String> {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "timestamp".to_string(),
            serde_json::Value::String(entry.timestamp.to_rfc3339()),
        );
        obj.insert(
            "level".to_string(),
            serde_json::Value::String(entry.level.to_str().to_string()),
        );
        if !entry.logger_name.is_empty() {
            obj.insert(
                "logger".to_string(),
                serde_json::Value::String(entry.logger_name.clone()),
            );
        }
        obj.insert(
            "message".to_string(),
            serde_json::Value::String(entry.message.clone()),
        );
        if let Some(caller) = &entry.caller {
            obj.insert(
                "caller".to_string(),
                serde_json::Value::String(caller.trimmed_path()),
            );
        }
        if let Some(stack) = &entry.stack {
            obj.insert(
                "stack".to_string(),
                serde_json::Value::String(stack.clone()),
            );
        }
        for (key, value) in fields.fields() {
            // Entry keys win over field keys of the same name.
            obj.entry(key.clone()).or_insert_with(|| value.to_json_value());
        }
        Ok(serde_json::to_string(&serde_json::Value::Object(obj))?)
    }
}

impl WriterSink<BufWriter<File>> {
    /// Append-mode text sink on a file.
    pub fn text_file<P: AsRef<Path>>(path: P, enabler: impl LevelEnabler + 'static) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::text(BufWriter::new(file), enabler))
    }

    /// Append-mode JSONL sink on a file.
    pub fn json_file<P: AsRef<Path>>(path: P, enabler: impl LevelEnabler + 'static) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::json(BufWriter::new(file), enabler))
    }
}

impl<W: Write + Send + 'static> Sink for WriterSink<W> {
    fn enabled(&self, level: LogLevel) -> bool {
        self.enabler.enabled(level)
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
        let mut accumulated = self.fields.clone();
        accumulated.extend(&fields);
        Arc::new(WriterSink {
            writer: Arc::clone(&self.writer),
            enabler: Arc::clone(&self.enabler),
            format: self.format,
            fields: accumulated,
        })
    }

    fn write(&self, entry: &LogEntry, fields: &LogContext) -> Result<()> {
        let line = if self.fields.is_empty() {
            match self.format {
                WriterFormat::Text => Self::format_text(entry, fields),
                WriterFormat::Json => Self::format_json(entry, fields)?,
            }
        } else {
            let mut merged = fields.clone();
            merged.merge_defaults(&self.fields);
            match self.format {
                WriterFormat::Text => Self::format_text(entry, &merged),
                WriterFormat::Json => Self::format_json(entry, &merged)?,
            }
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        // Error and above must hit the writer before the caller proceeds.
        if entry.level >= LogLevel::Error {
            writer.flush()?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}
