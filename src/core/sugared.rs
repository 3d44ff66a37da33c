//! Ergonomic logging surface layered over [`Logger`]

use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::logger::Logger;
use super::options::LoggerOption;

// Extra frames the sugared surface puts between the user and the
// admission pipeline: the public sugared method plus the internal
// dispatch below.
const SUGAR_CALLER_SKIP: isize = 2;

impl Logger {
    /// A sugared view over this snapshot. Costs nothing until used.
    #[must_use]
    pub fn sugar(&self) -> SugaredLogger {
        SugaredLogger {
            base: self.with_options([LoggerOption::add_caller_skip(SUGAR_CALLER_SKIP)]),
        }
    }
}

/// A convenience wrapper pairing each level with a fields variant.
///
/// `infow` and friends take call-site fields; the plain methods take only
/// a message. Call-site annotation still points at the original call site.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use std::sync::Arc;
///
/// let sugar = Logger::new(Arc::new(NopSink)).sugar();
/// sugar.infow(
///     "cache miss",
///     LogContext::new().with_field("key", "user:42"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SugaredLogger {
    base: Logger,
}

impl SugaredLogger {
    /// The underlying snapshot, with the sugared caller-skip removed.
    #[must_use]
    pub fn desugar(&self) -> Logger {
        self.base
            .with_options([LoggerOption::add_caller_skip(-SUGAR_CALLER_SKIP)])
    }

    /// Derive a sugared snapshot whose sink carries additional fields.
    #[must_use]
    pub fn with(&self, fields: LogContext) -> SugaredLogger {
        SugaredLogger {
            base: self.base.with(fields),
        }
    }

    /// Derive a sugared snapshot whose name has `name` appended.
    #[must_use]
    pub fn named(&self, name: &str) -> SugaredLogger {
        SugaredLogger {
            base: self.base.named(name),
        }
    }

    /// Log at an arbitrary level with call-site fields.
    pub fn logw(&self, level: LogLevel, message: impl Into<String>, fields: LogContext) {
        self.log(level, message.into(), fields);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message.into(), LogContext::new());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message.into(), LogContext::new());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message.into(), LogContext::new());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message.into(), LogContext::new());
    }

    pub fn dpanic(&self, message: impl Into<String>) {
        self.log(LogLevel::DPanic, message.into(), LogContext::new());
    }

    pub fn panic(&self, message: impl Into<String>) {
        self.log(LogLevel::Panic, message.into(), LogContext::new());
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message.into(), LogContext::new());
    }

    pub fn debugw(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::Debug, message.into(), fields);
    }

    pub fn infow(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::Info, message.into(), fields);
    }

    pub fn warnw(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::Warn, message.into(), fields);
    }

    pub fn errorw(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::Error, message.into(), fields);
    }

    pub fn dpanicw(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::DPanic, message.into(), fields);
    }

    pub fn panicw(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::Panic, message.into(), fields);
    }

    pub fn fatalw(&self, message: impl Into<String>, fields: LogContext) {
        self.log(LogLevel::Fatal, message.into(), fields);
    }

    /// Flush the sink.
    pub fn sync(&self) -> super::error::Result<()> {
        self.base.sync()
    }

    fn log(&self, level: LogLevel, message: String, fields: LogContext) {
        if let Some(record) = self.base.check(level, message) {
            let timestamp = record.entry().timestamp;
            if let Err(err) = record.write(fields) {
                self.base
                    .error_output
                    .report(&format!("{} write error: {}", timestamp, err));
            }
        }
    }
}
