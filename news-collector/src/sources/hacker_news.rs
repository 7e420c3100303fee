use super::http_client;
use crate::traits::ArticleSource;
use crate::types::{FetchConfig, Language, Provenance, RawRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

const ALGOLIA_SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search_by_date";
const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

impl Hit {
    pub fn item_url(&self) -> String {
        format!("{}{}", ITEM_URL, self.object_id)
    }
}

/// Hacker News stories from the Algolia search API.
pub struct HackerNewsSource {
    queries: Vec<String>,
    hits_per_page: u32,
    client: reqwest::Client,
}

impl HackerNewsSource {
    pub fn new(queries: Vec<String>, fetch_config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            queries,
            hits_per_page: fetch_config.hacker_news_hits_per_page,
            client: http_client(fetch_config, fetch_config.hacker_news_timeout)?,
        })
    }

    pub fn search_url(&self, query: &str, since: DateTime<Utc>) -> Result<Url> {
        let numeric_filter = format!("created_at_i>{}", since.timestamp());
        let hits_per_page = self.hits_per_page.to_string();
        let url = Url::parse_with_params(
            ALGOLIA_SEARCH_URL,
            &[
                ("query", query),
                ("tags", "story"),
                ("numericFilters", numeric_filter.as_str()),
                ("hitsPerPage", hits_per_page.as_str()),
            ],
        )?;
        Ok(url)
    }

    async fn search(&self, query: &str, since: DateTime<Utc>) -> Result<SearchResponse> {
        let url = self.search_url(query, since)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Convert search hits, skipping urls already seen in earlier queries.
pub fn records_from_hits(hits: Vec<Hit>, seen_urls: &mut HashSet<String>) -> Vec<RawRecord> {
    let mut records = Vec::new();

    for hit in hits {
        let item_url = hit.item_url();
        let article_url = hit
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| item_url.clone());

        if !seen_urls.insert(article_url.clone()) {
            continue;
        }

        records.push(RawRecord {
            title: hit.title,
            url: Some(article_url),
            published: hit.created_at,
            source: Some("Hacker News".to_string()),
            language: Some(Language::En),
            provenance: Some(Provenance::HackerNews),
            external_ref: Some(item_url),
            score: Some(hit.points.unwrap_or(0)),
        });
    }

    records
}

#[async_trait]
impl ArticleSource for HackerNewsSource {
    fn source_name(&self) -> String {
        "Hacker News".to_string()
    }

    async fn pull(&self, since: DateTime<Utc>) -> Result<Vec<RawRecord>> {
        let mut seen_urls = HashSet::new();
        let mut records = Vec::new();

        for query in &self.queries {
            match self.search(query, since).await {
                Ok(response) => records.extend(records_from_hits(response.hits, &mut seen_urls)),
                Err(e) => warn!("HN query '{}' failed: {}", query, e),
            }
        }

        info!("Hacker News -> {} records from {} queries", records.len(), self.queries.len());
        Ok(records)
    }
}
