//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

thread_local! {
    // Rendering a ThreadId allocates, so both values are computed once
    // per thread.
    static CURRENT_THREAD: (String, Option<String>) = {
        let current = std::thread::current();
        (
            format!("{:?}", current.id()),
            current.name().map(String::from),
        )
    };
}

fn current_thread() -> (String, Option<String>) {
    CURRENT_THREAD.with(Clone::clone)
}

/// Call-site annotation resolved from the stack at admission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCaller {
    /// Whether resolution produced a usable location.
    pub defined: bool,
    /// Program counter of the call site, zero when unresolved.
    pub pc: usize,
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl EntryCaller {
    pub fn new(pc: usize, file: impl Into<String>, line: u32) -> Self {
        Self {
            defined: pc != 0,
            pc,
            file: file.into(),
            line,
            function: None,
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// `file:line` with the file path trimmed to its last two segments.
    pub fn trimmed_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        let mut idx = match self.file.rfind('/') {
            Some(i) => i,
            None => return format!("{}:{}", self.file, self.line),
        };
        if let Some(i) = self.file[..idx].rfind('/') {
            idx = i;
        } else {
            return format!("{}:{}", self.file, self.line);
        }
        format!("{}:{}", &self.file[idx + 1..], self.line)
    }
}

impl fmt::Display for EntryCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.defined {
            return write!(f, "undefined");
        }
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An immutable record of one logging call.
///
/// Assembled by the admission pipeline and handed unchanged to every sink
/// that admitted it. The caller and stack annotations are filled in only
/// when the snapshot was configured to capture them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub logger_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<EntryCaller>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
}

impl LogEntry {
    /// Escape line breaks and tabs so one call cannot forge additional
    /// log lines.
    fn sanitize(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: String) -> Self {
        let (thread_id, thread_name) = current_thread();
        Self {
            level,
            timestamp: Utc::now(),
            logger_name: String::new(),
            message: Self::sanitize(&message),
            caller: None,
            stack: None,
            thread_id,
            thread_name,
        }
    }

    /// Replace the creation timestamp, typically with an injected clock's.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_caller(mut self, caller: EntryCaller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_sanitizes_message() {
        let entry = LogEntry::new(LogLevel::Info, "line1\nline2\r\tend".to_string());
        assert_eq!(entry.message, "line1\\nline2\\r\\tend");
    }

    #[test]
    fn test_entry_annotations() {
        let entry = LogEntry::new(LogLevel::Warn, "msg".to_string())
            .named("api.auth")
            .with_caller(EntryCaller::new(0x2a, "src/handler.rs", 42))
            .with_stack("frame_one\n\tsrc/handler.rs:42");

        assert_eq!(entry.logger_name, "api.auth");
        let caller = entry.caller.as_ref().unwrap();
        assert!(caller.defined);
        assert_eq!(caller.line, 42);
        assert!(entry.stack.is_some());
    }

    #[test]
    fn test_caller_trimmed_path() {
        let caller = EntryCaller::new(0x2a, "project/src/handler.rs", 7);
        assert_eq!(caller.trimmed_path(), "src/handler.rs:7");

        let short = EntryCaller::new(0x2a, "handler.rs", 7);
        assert_eq!(short.trimmed_path(), "handler.rs:7");
    }

    #[test]
    fn test_undefined_caller_renders_as_undefined() {
        let caller = EntryCaller::new(0, "src/handler.rs", 9);
        assert!(!caller.defined);
        assert_eq!(caller.to_string(), "undefined");
        assert_eq!(caller.trimmed_path(), "undefined");
    }
}
