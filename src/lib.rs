//! # Rust Logcore
//!
//! A leveled, structured logging core built around an explicit admission
//! step. Loggers are cheap immutable handles over a shared sink tree;
//! `check` decides once whether an entry will be written, and the
//! returned record carries everything needed to finish the write.
//!
//! ## Features
//!
//! - **Leveled Admission**: Sinks decide per entry, the logger pays a
//!   fast-path exit for disabled levels
//! - **Structured Fields**: Typed key/value context merged from logger
//!   snapshots and call sites
//! - **Terminal Levels**: Panic, fatal, and development panics run their
//!   action even when nothing is written
//! - **Composable Sinks**: Writer, console, hook, and level-raising
//!   wrappers share one trait
//!
//! ## Quick Start
//!
//! ```
//! use rust_logcore::prelude::*;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(WriterSink::text(Vec::new(), LogLevel::Info));
//! let logger = Logger::new(sink).named("app");
//!
//! logger.info("started");
//! logger.log_with(
//!     LogLevel::Warn,
//!     "slow request",
//!     LogContext::new().with_field("elapsed_ms", 1200),
//! );
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleSink;
    pub use crate::core::{
        catch_task_abort, write_hook, CheckedEntry, Clock, EntryCaller, ErrorOutput,
        FieldValue, LevelEnabler, LogContext, LogEntry, LogLevel, Logger, LoggerError,
        LoggerOption, NopSink, Result, Sink, StackDepth, SugaredLogger, TaskAbort,
        TerminalAction,
    };
    pub use crate::sinks::{HookedSink, IncreaseLevelSink, WriteHook, WriterFormat, WriterSink};
}

#[cfg(feature = "console")]
pub use crate::sinks::ConsoleSink;
pub use crate::core::{
    catch_task_abort, write_hook, BacktraceCapturer, CheckedEntry, Clock, EntryCaller,
    ErrorOutput, FieldValue, FixedClock, Frame, LevelEnabler, LogContext, LogEntry,
    LogLevel, Logger, LoggerError, LoggerOption, NopSink, Result, Sink, StackCapturer,
    StackDepth, StackSession, StderrOutput, SugaredLogger, SystemClock, TaskAbort,
    TerminalAction, TerminalHook,
};
pub use crate::sinks::{HookedSink, IncreaseLevelSink, WriteHook, WriterFormat, WriterSink};
