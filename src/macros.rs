//! Convenience macros for formatted logging
//!
//! Each macro expands to a single call on the logger, so the admission
//! decision and caller capture behave exactly as a direct method call.

/// Logs a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use rust_logcore::log;
///
/// let logger = Logger::nop();
/// log!(logger, LogLevel::Info, "listening on port {}", 8080);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Logs a formatted message at the debug level.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use rust_logcore::debug;
///
/// let logger = Logger::nop();
/// debug!(logger, "cache miss for key {}", "user:42");
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(format!($($arg)+))
    };
}

/// Logs a formatted message at the info level.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use rust_logcore::info;
///
/// let logger = Logger::nop();
/// info!(logger, "started in {}ms", 12);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(format!($($arg)+))
    };
}

/// Logs a formatted message at the warn level.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use rust_logcore::warn;
///
/// let logger = Logger::nop();
/// warn!(logger, "retrying request, attempt {}", 3);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(format!($($arg)+))
    };
}

/// Logs a formatted message at the error level.
///
/// # Examples
///
/// ```
/// use rust_logcore::prelude::*;
/// use rust_logcore::error;
///
/// let logger = Logger::nop();
/// error!(logger, "connection lost: {}", "timeout");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format!($($arg)+))
    };
}

/// Logs a formatted message at the dpanic level. Panics after the write
/// when the logger is in development mode.
#[macro_export]
macro_rules! dpanic {
    ($logger:expr, $($arg:tt)+) => {
        $logger.dpanic(format!($($arg)+))
    };
}

/// Logs a formatted message at the fatal level, then runs the logger's
/// fatal action. By default that terminates the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+))
    };
}
