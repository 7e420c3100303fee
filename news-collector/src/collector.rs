use crate::config::{ApiSource, TopicConfig};
use crate::dedup::Deduplicator;
use crate::filters::{filter_by_window, filter_excluded_keywords};
use crate::merge::{assign_ids, merge_results};
use crate::normalizer::normalize_all;
use crate::relevance::{RelevanceConnector, RelevanceVerdict};
use crate::sources::{GoogleNewsSource, HackerNewsSource};
use crate::traits::ArticleSource;
use crate::types::{Article, FetchConfig, Language, PipelineSettings, RawRecord, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Everything a report needs about one topic's run.
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub topic_id: String,
    pub label: String,
    pub selected: Vec<Article>,
    pub excluded: Vec<Article>,
    pub verdict: Option<RelevanceVerdict>,
    pub total_fetched: usize,
    pub total_after_filter: usize,
    /// Set when the relevance service was asked and failed.
    pub relevance_failed: bool,
}

/// Runs the collect, filter, dedup and merge pipeline for topics.
pub struct TopicCollector {
    fetch_config: FetchConfig,
    settings: PipelineSettings,
    connector: Box<dyn RelevanceConnector>,
}

impl TopicCollector {
    pub fn new(
        fetch_config: FetchConfig,
        settings: PipelineSettings,
        connector: Box<dyn RelevanceConnector>,
    ) -> Self {
        Self {
            fetch_config,
            settings,
            connector,
        }
    }

    /// Adapters for a topic, in the order their records are merged.
    pub fn build_sources(&self, topic: &TopicConfig) -> Result<Vec<Box<dyn ArticleSource>>> {
        let mut sources: Vec<Box<dyn ArticleSource>> = Vec::new();

        for keyword in &topic.keywords_en {
            sources.push(Box::new(GoogleNewsSource::new(keyword.as_str(), Language::En, &self.fetch_config)?));
        }
        for keyword in &topic.keywords_ja {
            sources.push(Box::new(GoogleNewsSource::new(keyword.as_str(), Language::Ja, &self.fetch_config)?));
        }
        for api in &topic.apis {
            match api {
                ApiSource::Hackernews { queries } => {
                    sources.push(Box::new(HackerNewsSource::new(queries.clone(), &self.fetch_config)?));
                }
                ApiSource::Unsupported => warn!("Skipping unsupported API source for '{}'", topic.label),
            }
        }

        Ok(sources)
    }

    /// Pull every source once; a failing source contributes nothing.
    pub async fn fetch_all(sources: &[Box<dyn ArticleSource>], since: DateTime<Utc>) -> Vec<RawRecord> {
        let mut records = Vec::new();

        for source in sources {
            match source.pull(since).await {
                Ok(pulled) => records.extend(pulled),
                Err(e) => warn!("{} failed: {}", source.source_name(), e),
            }
        }

        records
    }

    /// Collect one topic from its configured sources.
    pub async fn collect(&self, topic_id: &str, topic: &TopicConfig, now: DateTime<Utc>) -> Result<TopicOutcome> {
        info!("--- {} collection started ---", topic_id);

        let sources = self.build_sources(topic)?;
        let since = now - self.settings.lookback;
        let records = Self::fetch_all(&sources, since).await;

        Ok(self.process(topic_id, topic, records, now).await)
    }

    /// Run fetched records through the pipeline. Never fails; the worst case
    /// is every article selected without summaries.
    pub async fn process(
        &self,
        topic_id: &str,
        topic: &TopicConfig,
        records: Vec<RawRecord>,
        now: DateTime<Utc>,
    ) -> TopicOutcome {
        let total_fetched = records.len();
        info!("Fetched {} records in total", total_fetched);

        let articles = normalize_all(records);
        let articles = filter_by_window(articles, &now, self.settings.lookback);
        let articles = filter_excluded_keywords(articles, &topic.exclude_keywords);
        let mut articles = Deduplicator::new().deduplicate(articles);

        let total_after_filter = articles.len();
        info!("{} articles after filtering", total_after_filter);

        assign_ids(&mut articles);

        let mut relevance_failed = false;
        let verdict = if articles.is_empty() {
            None
        } else {
            info!("Asking {} for relevance", self.connector.connector_name());
            match self.connector.submit(&articles, &topic.label).await {
                Ok(verdict) => {
                    info!("-> {} articles accepted", verdict.articles.len());
                    Some(verdict)
                }
                Err(e) => {
                    error!("Relevance analysis failed, listing articles without summaries: {}", e);
                    relevance_failed = true;
                    None
                }
            }
        };

        let merged = merge_results(articles, verdict.as_ref());

        TopicOutcome {
            topic_id: topic_id.to_string(),
            label: topic.label.clone(),
            selected: merged.selected,
            excluded: merged.excluded,
            verdict,
            total_fetched,
            total_after_filter,
            relevance_failed,
        }
    }
}
