//! Sink implementations collaborating with the core

#[cfg(feature = "console")]
pub mod console;
pub mod hooked;
pub mod level_filter;
pub mod writer;

#[cfg(feature = "console")]
pub use console::ConsoleSink;
pub use hooked::{HookedSink, WriteHook};
pub use level_filter::IncreaseLevelSink;
pub use writer::{WriterFormat, WriterSink};
