use std::sync::Arc;
use std::time::Duration;

use racefetch_core::{QuietLogger, SharedLogger};

/// What to do with symlink entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SymlinkPolicy {
    /// Recreate the link when its target stays inside the destination.
    #[default]
    Recreate,
    /// Leave the link out.
    Skip,
    /// Fail the extraction.
    Reject,
}

#[derive(Clone)]
pub struct ExtractOptions {
    pub preserve_permissions: bool,
    pub symlinks: SymlinkPolicy,
    /// Minimum interval between two zip extraction percentage lines.
    pub min_report_span: Duration,
    pub logger: SharedLogger,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preserve_permissions: true,
            symlinks: SymlinkPolicy::default(),
            min_report_span: Duration::from_secs(1),
            logger: Arc::new(QuietLogger),
        }
    }
}

impl ExtractOptions {
    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    pub fn symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    pub fn min_report_span(mut self, span: Duration) -> Self {
        self.min_report_span = span;
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }
}
