//! Race mirror URLs and stream the fastest one into a directory.
//!
//! # Architecture
//!
//! - [`data`] - Immutable configuration
//! - `effects` - I/O behind the [`HttpClient`] seam
//!
//! # Pipeline
//!
//! Every candidate is probed concurrently; the first to answer 2xx and
//! deliver `probe_size` bytes wins and the rest are cancelled. The winner is
//! fetched again and its body is streamed, on one blocking thread, through
//! the download progress tracker, an optional gzip decoder and the tar or
//! zip extractor from `racefetch-archive`.
//!
//! ```no_run
//! use racefetch_fetch::{FetchOptions, Fetcher, ReqwestClient};
//!
//! # async fn run() -> racefetch_fetch::Result<()> {
//! let options = FetchOptions::new([
//!     "https://mirror-a.example/tool.tar.gz",
//!     "https://mirror-b.example/tool.tar.gz",
//! ])
//! .save_to("/tmp/tool");
//!
//! Fetcher::new(ReqwestClient::new()?, options).fetch().await?;
//! # Ok(())
//! # }
//! ```

pub mod data;
mod effects;
mod error;

pub use data::FetchOptions;
pub use data::options::DEFAULT_PROBE_SIZE;
pub use effects::{BodyStream, BoxStream, Fetcher, HttpClient, Response, fastest_url};

#[cfg(feature = "reqwest")]
pub use effects::{ClientConfig, DEFAULT_USER_AGENT, ReqwestClient};

pub use error::{Error, Result};
pub use tokio_util::sync::CancellationToken;
