//! Console sink with colored output

use crate::core::{
    CheckedEntry, LevelEnabler, LogContext, LogEntry, LogLevel, Result, Sink,
};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Writes entries to the terminal.
///
/// `Error` and above go to stderr, everything else to stdout.
pub struct ConsoleSink {
    use_colors: bool,
    enabler: Arc<dyn LevelEnabler>,
    fields: LogContext,
}

impl ConsoleSink {
    pub fn new(enabler: impl LevelEnabler + 'static) -> Self {
        Self {
            use_colors: true,
            enabler: Arc::new(enabler),
            fields: LogContext::new(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn format_line(&self, entry: &LogEntry, fields: &LogContext) -> String {
        use std::fmt::Write as _;

        let level_str = if self.use_colors {
            format!("{:<6}", entry.level.to_str())
                .color(entry.level.color_code())
                .to_string()
        } else {
            format!("{:<6}", entry.level.to_str())
        };

        let mut line = String::new();
        let _ = write!(
            line,
            "[{}] [{}]",
            entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            level_str
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
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Sink for ConsoleSink {
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
        Arc::new(ConsoleSink {
            use_colors: self.use_colors,
            enabler: Arc::clone(&self.enabler),
            fields: accumulated,
        })
    }

    fn write(&self, entry: &LogEntry, fields: &LogContext) -> Result<()> {
        let line = if self.fields.is_empty() {
            self.format_line(entry, fields)
        } else {
            let mut merged = fields.clone();
            merged.merge_defaults(&self.fields);
            self.format_line(entry, &merged)
        };
        if entry.level >= LogLevel::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        // Both streams are written to, so flush both.
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry::new(level, message.to_string())
            .at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_plain_format() {
        let sink = ConsoleSink::new(LogLevel::Debug).with_colors(false);
        let line = sink.format_line(
            &entry(LogLevel::Info, "started").named("svc"),
            &LogContext::new().with_field("port", 8080),
        );

        assert!(line.contains("[INFO  ]"));
        assert!(line.contains("svc"));
        assert!(line.contains("started"));
        assert!(line.contains("port=8080"));
    }

    #[test]
    fn test_stack_goes_on_following_lines() {
        let sink = ConsoleSink::new(LogLevel::Debug).with_colors(false);
        let line = sink.format_line(
            &entry(LogLevel::Error, "boom").with_stack("app::main\n\tsrc/main.rs:3"),
            &LogContext::new(),
        );

        let mut lines = line.lines();
        assert!(lines.next().unwrap().contains("boom"));
        assert_eq!(lines.next(), Some("app::main"));
    }

    #[test]
    fn test_write_does_not_fail() {
        let sink = Arc::new(ConsoleSink::new(LogLevel::Debug).with_colors(false));
        for level in LogLevel::ALL {
            let result = sink.write(&entry(level, "line"), &LogContext::new());
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_fielded_clone_keeps_threshold() {
        let sink: Arc<dyn Sink> = Arc::new(ConsoleSink::new(LogLevel::Warn).with_colors(false));
        let fielded = sink.with_fields(LogContext::new().with_field("zone", "eu-1"));

        assert!(!fielded.enabled(LogLevel::Info));
        assert!(fielded.enabled(LogLevel::Warn));
        assert!(fielded
            .write(&entry(LogLevel::Warn, "line"), &LogContext::new())
            .is_ok());
    }
}
