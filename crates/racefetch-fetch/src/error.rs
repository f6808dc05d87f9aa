//! Error types for racefetch-fetch.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Every candidate failed its probe, or there were none.
    #[error("not able to find a valid URL to download {urls:?}")]
    NoValidUrl { urls: Vec<String> },

    #[error("download cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("gzip decode failed: {0}")]
    Decode(#[source] io::Error),

    #[error(transparent)]
    Archive(racefetch_archive::Error),

    #[error(transparent)]
    Fs(#[from] racefetch_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<racefetch_archive::Error> for Error {
    fn from(e: racefetch_archive::Error) -> Self {
        match e {
            racefetch_archive::Error::Decode(e) => Error::Decode(e),
            racefetch_archive::Error::Fs(e) => Error::Fs(e),
            racefetch_archive::Error::Io(e) => Error::Io(e),
            e => Error::Archive(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
