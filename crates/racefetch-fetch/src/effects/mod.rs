//! Network and filesystem effects: the HTTP seam, the race and the
//! download pipeline.

mod cancel;
mod fetcher;
mod http;
mod race;

pub use fetcher::Fetcher;
pub use http::{BodyStream, BoxStream, HttpClient, Response};
pub use race::fastest_url;

#[cfg(feature = "reqwest")]
pub use http::{ClientConfig, DEFAULT_USER_AGENT, ReqwestClient};
