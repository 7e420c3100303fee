use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Language of an article, which decides the report section it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ja,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which adapter produced an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "google_news")]
    GoogleNews,
    #[serde(rename = "hackernews")]
    HackerNews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    /// Sort rank used by the ranker; unset importance ranks after `Low`.
    pub fn rank(importance: Option<Importance>) -> u8 {
        match importance {
            Some(Importance::High) => 0,
            Some(Importance::Medium) => 1,
            Some(Importance::Low) => 2,
            None => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }
}

/// A record as handed over by a source adapter, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub published: Option<String>,
    pub source: Option<String>,
    pub language: Option<Language>,
    pub provenance: Option<Provenance>,
    pub external_ref: Option<String>,
    pub score: Option<i64>,
}

/// A normalized news item flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// `None` when the adapter's date string could not be parsed.
    pub published: Option<DateTime<FixedOffset>>,
    pub source: String,
    #[serde(rename = "lang")]
    pub language: Language,
    #[serde(rename = "via")]
    pub provenance: Provenance,
    #[serde(rename = "hn_url", skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    #[serde(rename = "points", skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip)]
    pub summary: Option<String>,
    #[serde(skip)]
    pub importance: Option<Importance>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        published: Option<DateTime<FixedOffset>>,
        source: impl Into<String>,
        language: Language,
        provenance: Provenance,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            published,
            source: source.into(),
            language,
            provenance,
            external_ref: None,
            score: None,
            id: None,
            summary: None,
            importance: None,
        }
    }

    /// Published timestamp formatted the way reports show it.
    pub fn published_display(&self) -> String {
        self.published
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub google_news_timeout: Duration,
    pub hacker_news_timeout: Duration,
    pub hacker_news_hits_per_page: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "daily-news-collector/1.0".to_string(),
            google_news_timeout: Duration::from_secs(15),
            hacker_news_timeout: Duration::from_secs(10),
            hacker_news_hits_per_page: 10,
        }
    }
}

/// Tunables of the filter stages.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub lookback: chrono::Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            lookback: chrono::Duration::hours(24),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown topic '{topic}' (valid topics: {valid})")]
    UnknownTopic { topic: String, valid: String },

    #[error("Relevance service error: {0}")]
    Relevance(String),

    #[error("Timed out after {seconds}s: {what}")]
    Timeout { what: String, seconds: u64 },
}

pub type Result<T> = std::result::Result<T, CollectorError>;
