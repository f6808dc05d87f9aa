use std::io;

use futures_util::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::effects::http::BodyStream;

/// Ends `body` with an error once `cancel` fires.
///
/// The error kind is `Other`: `Interrupted` would be retried by `io::copy`
/// and `read_to_end` instead of aborting the extraction.
pub(crate) fn cancellable(body: BodyStream, cancel: CancellationToken) -> BodyStream {
    Box::pin(stream::unfold(
        (body, cancel, false),
        |(mut body, cancel, done)| async move {
            if done {
                return None;
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                chunk = body.next() => Some(chunk),
            };

            match next {
                None => Some((Err(cancelled()), (body, cancel, true))),
                Some(chunk) => chunk.map(|chunk| (chunk, (body, cancel, false))),
            }
        },
    ))
}

fn cancelled() -> io::Error {
    io::Error::other("download cancelled")
}
