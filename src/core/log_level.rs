//! Log level definitions and the level-enabling predicate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry.
///
/// Levels are totally ordered. `DPanic`, `Panic`, and `Fatal` are the
/// terminal severities: a call at one of these levels may halt the caller's
/// control flow after the write (see
/// [`TerminalAction`](crate::core::TerminalAction)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Panics in development mode, logs an error otherwise.
    DPanic = 4,
    /// Always panics after the write, even when the sink declined the entry.
    Panic = 5,
    /// Terminates the process after the write unless an override is set.
    Fatal = 6,
}

impl LogLevel {
    /// All levels in ascending severity order.
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::DPanic,
        LogLevel::Panic,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::DPanic => "DPANIC",
            LogLevel::Panic => "PANIC",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Whether a call at this level may terminate the caller regardless of
    /// sink admission. These levels skip the disabled-level fast path.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        *self >= LogLevel::DPanic
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::DPanic | LogLevel::Panic | LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "DPANIC" => Ok(LogLevel::DPanic),
            "PANIC" => Ok(LogLevel::Panic),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Decides whether a given severity is enabled.
///
/// `LogLevel` itself implements the trait with threshold semantics: a level
/// is enabled when it is at or above the threshold. Custom implementations
/// can express arbitrary predicates (for example, only `Warn` and `Fatal`).
pub trait LevelEnabler: Send + Sync {
    fn enabled(&self, level: LogLevel) -> bool;
}

impl LevelEnabler for LogLevel {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        level >= *self
    }
}
