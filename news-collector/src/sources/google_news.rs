use super::http_client;
use crate::traits::ArticleSource;
use crate::types::{CollectorError, FetchConfig, Language, Provenance, RawRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::{debug, info};
use url::Url;

const GOOGLE_NEWS_SEARCH_URL: &str = "https://news.google.com/rss/search";
const FALLBACK_SOURCE: &str = "Google News";

/// Google News RSS search for one keyword in one language edition.
pub struct GoogleNewsSource {
    keyword: String,
    language: Language,
    client: reqwest::Client,
}

impl GoogleNewsSource {
    pub fn new(keyword: impl Into<String>, language: Language, fetch_config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            keyword: keyword.into(),
            language,
            client: http_client(fetch_config, fetch_config.google_news_timeout)?,
        })
    }

    /// Search URL restricted to the last day of coverage.
    pub fn search_url(&self) -> Result<Url> {
        let (hl, gl, ceid) = match self.language {
            Language::En => ("en", "US", "US:en"),
            Language::Ja => ("ja", "JP", "JP:ja"),
        };
        let query = format!("{} when:1d", self.keyword);
        let url = Url::parse_with_params(
            GOOGLE_NEWS_SEARCH_URL,
            &[("q", query.as_str()), ("hl", hl), ("gl", gl), ("ceid", ceid)],
        )?;
        Ok(url)
    }

    /// Turn a feed document into raw records.
    pub fn parse_feed(&self, content: &[u8]) -> Result<Vec<RawRecord>> {
        let feed = parser::parse(content)
            .map_err(|e| CollectorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let records = feed
            .entries
            .into_iter()
            .map(|entry| {
                let title = entry.title.map(|t| t.content);
                let source = title
                    .as_deref()
                    .and_then(outlet_from_title)
                    .unwrap_or_else(|| FALLBACK_SOURCE.to_string());

                RawRecord {
                    title,
                    url: entry.links.first().map(|link| link.href.clone()),
                    published: entry.published.or(entry.updated).map(|dt| dt.to_rfc3339()),
                    source: Some(source),
                    language: Some(self.language),
                    provenance: Some(Provenance::GoogleNews),
                    external_ref: None,
                    score: None,
                }
            })
            .collect();

        Ok(records)
    }
}

/// Google News titles end in `" - <outlet>"`; the outlet is the last segment.
pub fn outlet_from_title(title: &str) -> Option<String> {
    let (_, outlet) = title.rsplit_once(" - ")?;
    let outlet = outlet.trim();
    (!outlet.is_empty()).then(|| outlet.to_string())
}

#[async_trait]
impl ArticleSource for GoogleNewsSource {
    fn source_name(&self) -> String {
        format!("Google News ({}) '{}'", self.language, self.keyword)
    }

    async fn pull(&self, since: DateTime<Utc>) -> Result<Vec<RawRecord>> {
        let url = self.search_url()?;
        debug!("Fetching Google News feed: {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        let records: Vec<RawRecord> = self
            .parse_feed(&body)?
            .into_iter()
            .filter(|record| {
                // The feed's own date filter is coarse; trim anything clearly older.
                record
                    .published
                    .as_deref()
                    .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                    .map_or(true, |published| published >= since)
            })
            .collect();

        info!("'{}' ({}) -> {} records", self.keyword, self.language, records.len());
        Ok(records)
    }
}
