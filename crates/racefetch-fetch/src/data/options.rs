use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use racefetch_archive::SymlinkPolicy;
use racefetch_core::{SharedLogger, TracingLogger};
use tokio_util::sync::CancellationToken;

/// Bytes a candidate must deliver to win the race.
pub const DEFAULT_PROBE_SIZE: usize = 64 * 1024;

/// Configuration for one fetch.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use racefetch_fetch::FetchOptions;
///
/// let options = FetchOptions::new(["https://a.example/t.tar.gz", "https://b.example/t.tar.gz"])
///     .save_to("/tmp/tool")
///     .min_report_span(Duration::from_millis(500));
/// assert_eq!(options.urls.len(), 2);
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Directory the payload is extracted into. Created with its parents.
    ///
    /// Default: a fresh directory under the system temp dir.
    pub save_to: PathBuf,

    /// Candidate mirrors, all serving the same resource.
    pub urls: Vec<String>,

    pub logger: SharedLogger,

    /// Bytes read from each candidate during the race. Should be much
    /// smaller than the resource itself.
    ///
    /// Default: 64 KiB
    pub probe_size: usize,

    /// Minimum interval between two percentage lines of the same phase.
    ///
    /// Default: 1s
    pub min_report_span: Duration,

    /// Cancels the race and the download.
    pub cancel: CancellationToken,

    pub symlinks: SymlinkPolicy,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("save_to", &self.save_to)
            .field("urls", &self.urls)
            .field("logger", &"{ ... }")
            .field("probe_size", &self.probe_size)
            .field("min_report_span", &self.min_report_span)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("symlinks", &self.symlinks)
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            save_to: default_save_to(),
            urls: Vec::new(),
            logger: Arc::new(TracingLogger),
            probe_size: DEFAULT_PROBE_SIZE,
            min_report_span: Duration::from_secs(1),
            cancel: CancellationToken::new(),
            symlinks: SymlinkPolicy::default(),
        }
    }
}

impl FetchOptions {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn save_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_to = dir.into();
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn probe_size(mut self, bytes: usize) -> Self {
        self.probe_size = bytes;
        self
    }

    #[must_use]
    pub fn min_report_span(mut self, span: Duration) -> Self {
        self.min_report_span = span;
        self
    }

    #[must_use]
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }
}

fn default_save_to() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir()
        .join("racefetch")
        .join(format!("{:x}-{nanos:x}", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = FetchOptions::default();
        assert!(options.urls.is_empty());
        assert_eq!(options.probe_size, 64 * 1024);
        assert_eq!(options.min_report_span, Duration::from_secs(1));
        assert!(options.save_to.starts_with(std::env::temp_dir().join("racefetch")));
        assert!(!options.cancel.is_cancelled());
    }

    #[test]
    fn builder() {
        let token = CancellationToken::new();
        let options = FetchOptions::new(["https://a.example/t.zip"])
            .url("https://b.example/t.zip")
            .save_to("out")
            .probe_size(16)
            .min_report_span(Duration::ZERO)
            .cancel(token.clone());

        assert_eq!(options.urls, ["https://a.example/t.zip", "https://b.example/t.zip"]);
        assert_eq!(options.save_to, PathBuf::from("out"));
        assert_eq!(options.probe_size, 16);
        token.cancel();
        assert!(options.cancel.is_cancelled());
    }

    #[test]
    fn default_save_to_differs_between_calls() {
        let a = FetchOptions::default().save_to;
        std::thread::sleep(Duration::from_millis(1));
        let b = FetchOptions::default().save_to;
        assert_ne!(a, b);
    }
}
