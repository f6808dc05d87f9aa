use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use racefetch_archive::SymlinkPolicy;
use racefetch_core::{QuietLogger, SharedLogger, TracingLogger};
use racefetch_fetch::{
    CancellationToken, ClientConfig, DEFAULT_PROBE_SIZE, DEFAULT_USER_AGENT, FetchOptions, Fetcher,
};
use racefetch_platform::user_cache_dir;

#[derive(Clone, Debug, Parser)]
#[command(name = "racefetch", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// Mirrors serving the same file; the fastest one is downloaded.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory to extract into [default: <user cache>/racefetch]
    #[arg(short, long, value_name = "DIR")]
    pub to: Option<PathBuf>,

    /// Bytes each mirror must deliver to win the race
    #[arg(long, default_value_t = DEFAULT_PROBE_SIZE)]
    pub probe_size: usize,

    /// Minimum milliseconds between two progress lines
    #[arg(long, default_value_t = 1000)]
    pub min_report_span_ms: u64,

    /// Seconds an idle connection is kept open
    #[arg(long, default_value_t = 90)]
    pub idle_timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Negotiate gzip content-encoding with the server
    #[arg(long)]
    pub gzip: bool,

    /// Move the contents of the single top-level directory up after extraction
    #[arg(long)]
    pub strip_first_dir: bool,

    /// Leave symlinks in the archive out instead of recreating them
    #[arg(long)]
    pub skip_symlinks: bool,

    /// Do not print download events
    #[arg(short, long)]
    pub quiet: bool,
}

impl App {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .user_agent(self.user_agent.clone())
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .negotiate_compression(self.gzip)
    }

    pub fn destination(&self) -> Result<PathBuf> {
        match &self.to {
            Some(to) => Ok(to.clone()),
            None => user_cache_dir()
                .map(|dir| dir.join("racefetch"))
                .context("no cache directory for this user, pass --to"),
        }
    }

    pub fn fetch_options(&self, dest: PathBuf, cancel: CancellationToken) -> FetchOptions {
        let logger: SharedLogger = if self.quiet {
            Arc::new(QuietLogger)
        } else {
            Arc::new(TracingLogger)
        };
        let symlinks = if self.skip_symlinks {
            SymlinkPolicy::Skip
        } else {
            SymlinkPolicy::Recreate
        };

        FetchOptions::new(self.urls.iter().cloned())
            .save_to(dest)
            .probe_size(self.probe_size)
            .min_report_span(Duration::from_millis(self.min_report_span_ms))
            .logger(logger)
            .symlinks(symlinks)
            .cancel(cancel)
    }

    pub async fn run(self) -> Result<()> {
        let dest = self.destination()?;
        let cancel = CancellationToken::new();

        let on_ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling download");
                on_ctrl_c.cancel();
            }
        });

        let fetcher = Fetcher::with_config(&self.client_config(), self.fetch_options(dest.clone(), cancel))
            .context("failed to build HTTP client")?;
        let report = fetcher.fetch().await?;

        if self.strip_first_dir {
            racefetch_fs::strip_first_dir(&dest)
                .with_context(|| format!("failed to strip the top-level directory of {}", dest.display()))?;
        }

        tracing::debug!(
            format = %report.format,
            entries = report.entry_count,
            files = report.files().count(),
            symlinks = report.entries.iter().filter(|e| e.is_symlink()).count(),
            bytes = report.total_bytes,
            dest = %dest.display(),
            "fetch finished"
        );
        Ok(())
    }
}
