use std::io;
use std::path::Path;
use std::sync::Arc;

use racefetch_archive::{ArchiveReport, ExtractOptions};
use racefetch_core::{Event, Phase, ProgressTracker, TrackedReader};
use tokio_util::io::{StreamReader, SyncIoBridge};

use crate::data::FetchOptions;
use crate::effects::cancel::cancellable;
use crate::effects::http::HttpClient;
use crate::effects::race;
use crate::error::{Error, Result};

/// Races the configured mirrors and extracts the winner into `save_to`.
pub struct Fetcher<C: HttpClient> {
    client: Arc<C>,
    options: FetchOptions,
}

#[cfg(feature = "reqwest")]
impl Fetcher<crate::effects::http::ReqwestClient> {
    /// Fetcher over a [`ReqwestClient`](crate::ReqwestClient) built from `config`.
    pub fn with_config(config: &crate::effects::http::ClientConfig, options: FetchOptions) -> Result<Self> {
        let client = crate::effects::http::ReqwestClient::with_config(config)?;
        Ok(Self::new(client, options))
    }
}

impl<C: HttpClient + 'static> Fetcher<C> {
    pub fn new(client: C, options: FetchOptions) -> Self {
        Self {
            client: Arc::new(client),
            options,
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// The first candidate to prove itself alive, if any.
    pub async fn fastest_url(&self) -> Option<String> {
        race::fastest_url(
            &self.client,
            &self.options.urls,
            self.options.probe_size,
            &self.options.cancel,
        )
        .await
    }

    /// Race the candidates, then download and extract the winner.
    ///
    /// A failure after the winner is picked is final: the other candidates
    /// are not retried.
    pub async fn fetch(&self) -> Result<ArchiveReport> {
        if self.options.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let Some(url) = self.fastest_url().await else {
            if self.options.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            return Err(Error::NoValidUrl {
                urls: self.options.urls.clone(),
            });
        };

        self.download(&url).await
    }

    /// Download `url` and extract it into `save_to`, skipping the race.
    ///
    /// The layout is taken from the trailing name of the URL path: `.gz`
    /// and `.tgz` are gunzipped, `.tar` is streamed, `.zip` is buffered and
    /// anything else is saved as a single file.
    pub async fn download(&self, url: &str) -> Result<ArchiveReport> {
        let options = &self.options;
        let cancel = &options.cancel;

        options.logger.log(&Event::Download {
            url: url.to_string(),
        });

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.client.get(url) => response?,
        };

        if !response.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let name = trailing_name(url);
        tracing::debug!(url, name = %name, content_length = ?response.content_length, "downloading");

        let tracker = ProgressTracker::new(
            Phase::Download,
            response.content_length,
            options.min_report_span,
            options.logger.clone(),
        );
        let body = cancellable(response.body, cancel.clone());
        // Must be created inside the runtime; it blocks on it from the worker thread.
        let reader = SyncIoBridge::new(StreamReader::new(body));

        let dest = options.save_to.clone();
        let extract = ExtractOptions::default()
            .symlinks(options.symlinks)
            .min_report_span(options.min_report_span)
            .logger(options.logger.clone());

        let extracted = tokio::task::spawn_blocking(move || {
            let mut reader = TrackedReader::new(reader, tracker);
            let extracted = extract_and_drain(&mut reader, &dest, &name, &extract);
            tracing::debug!(bytes = reader.tracker().seen(), "body consumed");
            extracted
        })
        .await?;

        let report = match extracted {
            Err(_) if cancel.is_cancelled() => return Err(Error::Cancelled),
            extracted => extracted?,
        };

        options.logger.log(&Event::Downloaded {
            dir: options.save_to.clone(),
        });
        Ok(report)
    }
}

fn extract_and_drain<R: io::Read>(
    reader: &mut R,
    dest: &Path,
    name: &str,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let report = racefetch_archive::extract_payload(&mut *reader, dest, name, options)?;
    // Archive readers may stop before the end of the body (tar padding, gzip
    // trailer); reading on lets the download tracker see end-of-stream.
    io::copy(reader, &mut io::sink())?;
    Ok(report)
}

/// Last path segment of `url`, ignoring query and fragment. Falls back to
/// `download` when the path ends with a slash.
pub(crate) fn trailing_name(url: &str) -> String {
    let name = parsed_name(url).unwrap_or_else(|| {
        url.split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string()
    });

    if name.is_empty() {
        "download".to_string()
    } else {
        name
    }
}

#[cfg(feature = "reqwest")]
fn parsed_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let name = parsed.path_segments()?.next_back()?;
    Some(name.to_string())
}

#[cfg(not(feature = "reqwest"))]
fn parsed_name(_url: &str) -> Option<String> {
    None
}
