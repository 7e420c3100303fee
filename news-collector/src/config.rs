use crate::types::{CollectorError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "DAILY_NEWS_CONFIG";
pub const REPORTS_DIR_ENV: &str = "DAILY_NEWS_REPORTS_DIR";

/// Extra search API attached to a topic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApiSource {
    Hackernews {
        #[serde(default)]
        queries: Vec<String>,
    },
    /// Any API type this build does not know; skipped with a warning.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicConfig {
    pub label: String,
    #[serde(default)]
    pub keywords_en: Vec<String>,
    #[serde(default)]
    pub keywords_ja: Vec<String>,
    #[serde(default)]
    pub apis: Vec<ApiSource>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

/// Contents of the topics file.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    pub topics: BTreeMap<String, TopicConfig>,
}

impl CollectorConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| CollectorError::Config(format!("invalid config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CollectorError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&content)?;
        info!("Loaded {} topics from {}", config.topics.len(), path.display());
        Ok(config)
    }

    pub fn topic_ids(&self) -> Vec<String> {
        self.topics.keys().cloned().collect()
    }

    /// Resolve a topic argument: `all`, one id, or a comma-separated list.
    ///
    /// Unknown ids are an error naming the valid choices.
    pub fn select_topics(&self, selection: &str) -> Result<Vec<String>> {
        if selection.trim() == "all" {
            return Ok(self.topic_ids());
        }

        let selected: Vec<String> = selection
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        for id in &selected {
            if !self.topics.contains_key(id) {
                return Err(CollectorError::UnknownTopic {
                    topic: id.clone(),
                    valid: format!("{}, all", self.topic_ids().join(", ")),
                });
            }
        }

        if selected.is_empty() {
            return Err(CollectorError::Config("no topic given".to_string()));
        }
        Ok(selected)
    }
}

/// Pick a path from the command line, then the environment, then a default.
pub fn resolve_path(cli: Option<PathBuf>, env_var: &str, default: &str) -> PathBuf {
    cli.or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "topics": {
            "did-vc": {
                "label": "DID/VC",
                "keywords_en": ["decentralized identity"],
                "keywords_ja": ["分散型ID"],
                "apis": [{"type": "hackernews", "queries": ["verifiable credentials"]},
                         {"type": "reddit", "queries": ["x"]}],
                "exclude_keywords": ["crypto"]
            },
            "ai-dev": {"label": "AI Dev"}
        }
    }"#;

    #[test]
    fn test_parse_topics() {
        let config = CollectorConfig::from_json(SAMPLE).unwrap();
        let topic = &config.topics["did-vc"];
        assert_eq!(topic.label, "DID/VC");
        assert_eq!(
            topic.apis,
            vec![
                ApiSource::Hackernews {
                    queries: vec!["verifiable credentials".to_string()]
                },
                ApiSource::Unsupported,
            ]
        );
        assert!(config.topics["ai-dev"].keywords_en.is_empty());
    }

    #[test]
    fn test_select_topics() {
        let config = CollectorConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.select_topics("all").unwrap(), vec!["ai-dev", "did-vc"]);
        assert_eq!(config.select_topics(" did-vc , ai-dev").unwrap(), vec!["did-vc", "ai-dev"]);

        let err = config.select_topics("did-vc,unknown").unwrap_err();
        assert!(matches!(err, CollectorError::UnknownTopic { ref topic, .. } if topic == "unknown"));
        assert!(err.to_string().contains("ai-dev, did-vc, all"));
    }
}
