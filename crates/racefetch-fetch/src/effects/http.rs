use std::future::Future;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::Result;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response body. Transport failures surface as I/O errors so the body can be
/// adapted into a reader.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Status line and body of a GET. Dropping it releases the connection.
pub struct Response {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: BodyStream,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations handle their own redirect following and timeouts. A
/// non-success status is not an error at this level; callers inspect
/// [`Response::status`].
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - In-memory clients in tests
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Response>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;

    use super::*;
    use crate::error::Error;

    /// Browser-like agent; some mirrors refuse unknown clients.
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";

    /// Transport settings for [`ReqwestClient`].
    #[derive(Clone, Debug)]
    pub struct ClientConfig {
        pub user_agent: String,
        /// How long an idle pooled connection is kept.
        pub idle_timeout: Duration,
        /// Reuse connections between requests. Off by default so every
        /// candidate in a race gets its own connection.
        pub keep_alive: bool,
        /// Send `Accept-Encoding: gzip` and decode transparently. The
        /// content length is then unknown and download progress is silent.
        pub negotiate_compression: bool,
        pub connect_timeout: Option<Duration>,
    }

    impl Default for ClientConfig {
        fn default() -> Self {
            Self {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                idle_timeout: Duration::from_secs(90),
                keep_alive: false,
                negotiate_compression: false,
                connect_timeout: None,
            }
        }
    }

    impl ClientConfig {
        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = user_agent.into();
            self
        }

        pub fn idle_timeout(mut self, timeout: Duration) -> Self {
            self.idle_timeout = timeout;
            self
        }

        pub fn keep_alive(mut self, keep_alive: bool) -> Self {
            self.keep_alive = keep_alive;
            self
        }

        pub fn negotiate_compression(mut self, negotiate: bool) -> Self {
            self.negotiate_compression = negotiate;
            self
        }

        pub fn connect_timeout(mut self, timeout: Duration) -> Self {
            self.connect_timeout = Some(timeout);
            self
        }
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            Self::with_config(&ClientConfig::default())
        }

        pub fn with_config(config: &ClientConfig) -> Result<Self> {
            let mut builder = reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .pool_idle_timeout(config.idle_timeout)
                .gzip(config.negotiate_compression);

            if !config.keep_alive {
                builder = builder.pool_max_idle_per_host(0);
            }
            if let Some(timeout) = config.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }

            let client = builder.build().map_err(|e| Error::Http(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        async fn get(&self, url: &str) -> Result<Response> {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| Error::Http(e.to_string()))?;

            let status = response.status().as_u16();
            let content_length = response.content_length();
            let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));

            Ok(Response {
                status,
                content_length,
                body: Box::pin(body),
            })
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientConfig, DEFAULT_USER_AGENT, ReqwestClient};
