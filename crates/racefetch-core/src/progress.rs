//! Throttled percentage reporting around byte streams.
//!
//! A [`ProgressTracker`] counts bytes and decides when a percentage line is
//! due. [`TrackedReader`] owns one tracker for the lifetime of a stream, while
//! [`TrackedWriter`] borrows one so that consecutive writers (one per archive
//! member) advance a single cumulative count.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use crate::event::Event;
use crate::logger::SharedLogger;

/// Which sequence of percentages a tracker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Bytes received from the network, reported as `Progress: NN%`.
    Download,
    /// Bytes written while re-extracting a buffered zip, reported as `NN%`.
    Unzip,
}

pub struct ProgressTracker {
    phase: Phase,
    total: Option<u64>,
    seen: u64,
    min_span: Duration,
    last: Option<Instant>,
    finished: bool,
    logger: SharedLogger,
}

impl ProgressTracker {
    /// `total` of `None` or `Some(0)` disables reporting.
    pub fn new(phase: Phase, total: Option<u64>, min_span: Duration, logger: SharedLogger) -> Self {
        Self {
            phase,
            total,
            seen: 0,
            min_span,
            last: None,
            finished: false,
            logger,
        }
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Floor of `seen * 100 / total`, or `None` when the total is unknown or zero.
    pub fn percent(&self) -> Option<u64> {
        match self.total {
            Some(total) if total > 0 => Some(self.seen.saturating_mul(100) / total),
            _ => None,
        }
    }

    /// Account for one read. `ended` is set when the read hit end-of-stream or failed.
    pub fn on_read(&mut self, n: usize, ended: bool) {
        self.seen += n as u64;

        if ended {
            if self.is_complete() {
                self.finish();
            }
            return;
        }

        self.report();
    }

    /// Account for one write.
    pub fn on_write(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.seen += n as u64;

        if self.is_complete() {
            self.finish();
            return;
        }

        self.report();
    }

    fn is_complete(&self) -> bool {
        matches!(self.total, Some(total) if total > 0 && total == self.seen)
    }

    // The terminal line ignores the throttle window.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.last = Some(Instant::now());
        self.emit(100);
    }

    fn report(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last {
            if now.duration_since(last) < self.min_span {
                return;
            }
        }

        let Some(percent) = self.percent() else {
            return;
        };

        self.last = Some(now);
        self.emit(percent);
    }

    fn emit(&self, percent: u64) {
        let event = match self.phase {
            Phase::Download => Event::Progress { percent },
            Phase::Unzip => Event::UnzipProgress { percent },
        };
        self.logger.log(&event);
    }
}

/// Counts bytes read through `inner`.
pub struct TrackedReader<R> {
    inner: R,
    tracker: ProgressTracker,
}

impl<R> TrackedReader<R> {
    pub fn new(inner: R, tracker: ProgressTracker) -> Self {
        Self { inner, tracker }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }
}

impl<R: Read> Read for TrackedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return self.inner.read(buf);
        }

        match self.inner.read(buf) {
            Ok(0) => {
                self.tracker.on_read(0, true);
                Ok(0)
            }
            Ok(n) => {
                self.tracker.on_read(n, false);
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => {
                self.tracker.on_read(0, true);
                Err(e)
            }
        }
    }
}

/// Counts bytes written through `inner` into a borrowed tracker.
pub struct TrackedWriter<'a, W> {
    inner: W,
    tracker: &'a mut ProgressTracker,
}

impl<'a, W> TrackedWriter<'a, W> {
    pub fn new(inner: W, tracker: &'a mut ProgressTracker) -> Self {
        Self { inner, tracker }
    }
}

impl<W: Write> Write for TrackedWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.tracker.on_write(n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
