//! Errors surfaced by the logging core

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Failures a logging call can surface to its caller.
///
/// Intentional terminations (panic, process exit, task abort) never appear
/// here. They are control-flow contracts of the terminal levels, not
/// errors.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// The sink's underlying writer failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The entry could not be encoded for the sink's output format.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// An option or sink was configured with inconsistent values.
    #[error("invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Call-site capture resolved no frames.
    #[error("failed to get caller")]
    CallerUnavailable,

    /// A sink declined the write for its own reasons.
    #[error("sink error: {0}")]
    Sink(String),

    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn sink(message: impl Into<String>) -> Self {
        LoggerError::Sink(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        LoggerError::Other(message.into())
    }
}
