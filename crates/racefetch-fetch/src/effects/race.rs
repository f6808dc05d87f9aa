use std::sync::{Arc, OnceLock};

use futures_util::StreamExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::effects::http::HttpClient;
use crate::error::{Error, Result};

/// Probe every candidate concurrently and return the first to deliver
/// `probe_size` bytes.
///
/// The winner cancels its siblings; all probes are joined before returning,
/// so no request outlives the call. Candidate failures are only logged.
/// Returns `None` when every candidate failed, there were none, or `cancel`
/// fired first.
pub async fn fastest_url<C>(
    client: &Arc<C>,
    urls: &[String],
    probe_size: usize,
    cancel: &CancellationToken,
) -> Option<String>
where
    C: HttpClient + 'static,
{
    if cancel.is_cancelled() {
        return None;
    }

    let race = cancel.child_token();
    let winner = Arc::new(OnceLock::new());
    let mut probes = JoinSet::new();

    for url in urls {
        let client = Arc::clone(client);
        let race = race.clone();
        let winner = Arc::clone(&winner);
        let url = url.clone();

        probes.spawn(async move {
            let probed = tokio::select! {
                biased;
                _ = race.cancelled() => return,
                probed = probe(client.as_ref(), &url, probe_size) => probed,
            };

            match probed {
                // A probe finishing after cancellation does not count.
                Ok(()) if race.is_cancelled() && winner.get().is_none() => {}
                Ok(()) => {
                    if winner.set(url.clone()).is_ok() {
                        tracing::debug!(url = %url, "candidate won the race");
                        race.cancel();
                    }
                }
                Err(e) => tracing::debug!(url = %url, error = %e, "candidate failed"),
            }
        });
    }

    while let Some(joined) = probes.join_next().await {
        if let Err(e) = joined {
            tracing::debug!(error = %e, "probe task failed");
        }
    }

    winner.get().cloned()
}

/// A candidate is alive when it answers 2xx and then yields `probe_size`
/// bytes, or ends cleanly before that.
async fn probe<C: HttpClient>(client: &C, url: &str, probe_size: usize) -> Result<()> {
    let mut response = client.get(url).await?;
    if !response.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    let mut read = 0;
    while read < probe_size {
        match response.body.next().await {
            Some(chunk) => read += chunk?.len(),
            None => break,
        }
    }
    Ok(())
}
