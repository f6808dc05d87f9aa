use std::sync::{Arc, Mutex};

use crate::event::Event;

/// Sink for fetch events.
///
/// Any `Fn(&Event) + Send + Sync` closure is a logger.
pub trait Logger: Send + Sync {
    fn log(&self, event: &Event);
}

pub type SharedLogger = Arc<dyn Logger>;

impl<F> Logger for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn log(&self, event: &Event) {
        self(event)
    }
}

/// Forwards every event to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, event: &Event) {
        tracing::info!(kind = event.tag(), "{event}");
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietLogger;

impl Logger for QuietLogger {
    fn log(&self, _event: &Event) {}
}

/// Fans one event out to several loggers, in order.
#[derive(Clone, Default)]
pub struct MultiLogger {
    loggers: Vec<SharedLogger>,
}

impl MultiLogger {
    pub fn new(loggers: Vec<SharedLogger>) -> Self {
        Self { loggers }
    }

    pub fn push(mut self, logger: SharedLogger) -> Self {
        self.loggers.push(logger);
        self
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &Event) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

/// Keeps every rendered line in memory.
///
/// Clones share the same buffer, so one clone can be handed to a fetch while
/// another reads the lines afterwards.
#[derive(Debug, Clone, Default)]
pub struct BufferLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// All lines joined with a trailing newline each.
    pub fn text(&self) -> String {
        self.lines().iter().map(|line| format!("{line}\n")).collect()
    }
}

impl Logger for BufferLogger {
    fn log(&self, event: &Event) {
        let line = event.to_string();
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}
