//! Event vocabulary and byte-count progress shared by the racefetch crates.
//!
//! # Architecture
//!
//! - [`Event`] - The log lines a fetch produces, rendered by `Display`
//! - [`Logger`] - The single seam through which events leave the library
//! - [`progress`] - Throttled percentage reporting around `Read`/`Write`

mod event;
mod logger;
pub mod progress;

pub use event::Event;
pub use logger::{BufferLogger, Logger, MultiLogger, QuietLogger, SharedLogger, TracingLogger};
pub use progress::{Phase, ProgressTracker, TrackedReader, TrackedWriter};
