pub mod google_news;
pub mod hacker_news;

pub use google_news::GoogleNewsSource;
pub use hacker_news::HackerNewsSource;

use crate::types::{CollectorError, FetchConfig, Result};
use std::time::Duration;

/// Build a client for one adapter.
pub(crate) fn http_client(config: &FetchConfig, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(timeout)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .build()
        .map_err(CollectorError::Http)
}
