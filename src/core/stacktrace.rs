//! Lazy call-site and stack capture
//!
//! Capture is deferred until an entry is known to be written, so disabled
//! log calls never pay for frame resolution. The capturer sits behind a
//! trait to keep tests deterministic.

use std::cell::RefCell;

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Program counter, zero when the symbol could not be resolved.
    pub pc: usize,
    pub function: String,
    pub file: String,
    pub line: u32,
}

/// How much of the stack a capture should resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDepth {
    /// Only the immediate caller.
    First,
    /// Every frame above the skip point.
    Full,
}

/// The frames resolved by one capture.
#[derive(Debug, Default)]
pub struct StackSession {
    frames: Vec<Frame>,
}

impl StackSession {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The first resolved frame, the original call site.
    pub fn caller(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn count(&self) -> usize {
        self.frames.len()
    }

    /// Render the frames as `function\n\tfile:line`, one frame per pair of
    /// lines.
    pub fn format(&self) -> String {
        format_frames(&self.frames)
    }
}

/// Resolves stack frames above the logging machinery.
pub trait StackCapturer: Send + Sync {
    /// Capture frames, skipping `skip` caller frames beyond the capture
    /// machinery itself.
    fn capture(&self, skip: usize, depth: StackDepth) -> StackSession;
}

/// Default capturer backed by the `backtrace` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapturer;

impl BacktraceCapturer {
    fn is_machinery(function: &str) -> bool {
        function.starts_with("backtrace")
            || function.contains("stacktrace::BacktraceCapturer")
            || function.contains("stacktrace::{{impl}}")
    }
}

impl StackCapturer for BacktraceCapturer {
    fn capture(&self, skip: usize, depth: StackDepth) -> StackSession {
        let limit = match depth {
            StackDepth::First => 1,
            StackDepth::Full => usize::MAX,
        };

        let mut frames = Vec::new();
        let mut skipped = 0usize;
        backtrace::trace(|raw| {
            let pc = raw.ip() as usize;
            let mut resolved: Option<Frame> = None;
            backtrace::resolve_frame(raw, |symbol| {
                if resolved.is_some() {
                    return;
                }
                let function = symbol
                    .name()
                    .map(|name| name.to_string())
                    .unwrap_or_default();
                let file = symbol
                    .filename()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                let line = symbol.lineno().unwrap_or(0);
                resolved = Some(Frame {
                    pc,
                    function,
                    file,
                    line,
                });
            });

            let frame = match resolved {
                Some(frame) => frame,
                None => return true,
            };
            if frames.is_empty() && skipped == 0 && Self::is_machinery(&frame.function) {
                return true;
            }
            if skipped < skip {
                skipped += 1;
                return true;
            }
            frames.push(frame);
            frames.len() < limit
        });

        StackSession::new(frames)
    }
}

thread_local! {
    // Scratch buffer reused across captures on the same thread.
    static FORMAT_BUF: RefCell<String> = const { RefCell::new(String::new()) };
}

fn format_frames(frames: &[Frame]) -> String {
    use std::fmt::Write;

    FORMAT_BUF.with(|buf| {
        let mut buf = buf.borrow_mut();
        buf.clear();
        for (i, frame) in frames.iter().enumerate() {
            if i > 0 {
                buf.push('\n');
            }
            let _ = write!(buf, "{}\n\t{}:{}", frame.function, frame.file, frame.line);
        }
        buf.clone()
    })
}
