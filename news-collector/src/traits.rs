use crate::types::{RawRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Something that can be asked for recent news records (an RSS search, an API, ...).
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Human-readable name for log lines
    fn source_name(&self) -> String;

    /// Fetch records published since `since`.
    ///
    /// One call is one attempt; callers treat an error as "no records".
    async fn pull(&self, since: DateTime<Utc>) -> Result<Vec<RawRecord>>;
}
