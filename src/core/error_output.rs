//! Destination for the logger's own internal errors

/// Receives one formatted line per internal failure.
///
/// Internal errors are failures of the logging machinery itself, such as a
/// sink write that returned an error or a call-site capture that resolved
/// no frames. They are reported here instead of being silently dropped.
pub trait ErrorOutput: Send + Sync {
    fn report(&self, line: &str);
}

/// Reports internal errors to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrOutput;

impl ErrorOutput for StderrOutput {
    fn report(&self, line: &str) {
        eprintln!("{}", line);
    }
}
