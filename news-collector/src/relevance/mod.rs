pub mod api;
pub mod cli;

pub use api::AnthropicApiConnector;
pub use cli::ClaudeCliConnector;

use crate::types::{Article, CollectorError, Importance, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{info, warn};

/// Prompt used when no template file is configured.
pub const DEFAULT_PROMPT_TEMPLATE: &str = include_str!("prompt_template.md");

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json)?\s*").unwrap());
static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// An article the relevance service accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedArticle {
    pub id: String,
    #[serde(default, alias = "summary_ja")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_importance")]
    pub importance: Option<Importance>,
}

/// Unknown or oddly cased importance labels read as "not given".
fn lenient_importance<'de, D>(deserializer: D) -> std::result::Result<Option<Importance>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|label| match label.trim().to_lowercase().as_str() {
        "high" => Some(Importance::High),
        "medium" => Some(Importance::Medium),
        "low" => Some(Importance::Low),
        _ => None,
    }))
}

/// A rejected article with its title translated for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedArticle {
    pub id: String,
    #[serde(default, alias = "title_ja")]
    pub localized_title: String,
}

/// What the relevance service decided for one batch.
///
/// Ids not listed in `articles` are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    #[serde(default)]
    pub articles: Vec<AcceptedArticle>,
    #[serde(default)]
    pub excluded: Vec<RejectedArticle>,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub excluded_reasons: Option<String>,
}

impl RelevanceVerdict {
    /// A verdict naming no article at all, accepted or rejected.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.excluded.is_empty()
    }

    pub fn localized_title(&self, id: &str) -> Option<&str> {
        self.excluded
            .iter()
            .find(|rejected| rejected.id == id)
            .map(|rejected| rejected.localized_title.as_str())
            .filter(|title| !title.is_empty())
    }
}

/// Capability of judging relevance and summarizing a batch of articles.
///
/// Implementations differ only in transport; callers must not care which
/// one they hold.
#[async_trait]
pub trait RelevanceConnector: Send + Sync {
    fn connector_name(&self) -> String;

    /// Send id-tagged articles and the topic label, get back a verdict.
    async fn submit(&self, articles: &[Article], topic_label: &str) -> Result<RelevanceVerdict>;
}

/// Builds the prompt text for one submission.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            CollectorError::Config(format!("cannot read prompt template {}: {}", path.display(), e))
        })?;
        Ok(Self::new(template))
    }

    pub fn render(&self, articles: &[Article], topic_label: &str) -> Result<String> {
        let articles_json = serde_json::to_string_pretty(articles)?;
        Ok(self
            .template
            .replace("{{TOPIC_LABEL}}", topic_label)
            .replace("{{ARTICLES_JSON}}", &articles_json))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_TEMPLATE)
    }
}

/// Pull the verdict object out of free-form model output.
///
/// Code fences are stripped and the outermost `{...}` span is parsed. A
/// verdict that names no article is reported as an error so callers can
/// tell it apart from a real "everything rejected" answer.
pub fn extract_verdict(output: &str, transport: &str) -> Result<RelevanceVerdict> {
    let cleaned = CODE_FENCE.replace_all(output, "");
    let cleaned = cleaned.trim();

    let Some(object) = JSON_OBJECT.find(cleaned) else {
        warn!("No JSON found in {} output: {}", transport, preview(output));
        return Err(CollectorError::Relevance(format!("no JSON object in {} output", transport)));
    };

    let verdict: RelevanceVerdict = serde_json::from_str(object.as_str()).map_err(|e| {
        warn!("Failed to parse {} output as JSON: {}", transport, preview(output));
        CollectorError::Relevance(format!("malformed {} output: {}", transport, e))
    })?;

    if verdict.is_empty() {
        return Err(CollectorError::Relevance(format!("empty verdict from {}", transport)));
    }
    Ok(verdict)
}

fn preview(output: &str) -> &str {
    let mut end = output.len().min(500);
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    &output[..end]
}

/// Pick the transport once for the whole process: the Messages API when an
/// API key is available, otherwise the local `claude` command.
pub fn connector_from_env(template: PromptTemplate) -> Result<Box<dyn RelevanceConnector>> {
    match std::env::var("ANTHROPIC_API_KEY") {
        Ok(api_key) if !api_key.trim().is_empty() => {
            let model = std::env::var("CLAUDE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
            info!("Relevance transport: Messages API (model={})", model);
            Ok(Box::new(AnthropicApiConnector::new(api_key, model, template)?))
        }
        _ => {
            info!("Relevance transport: claude CLI");
            Ok(Box::new(ClaudeCliConnector::new(template)))
        }
    }
}

/// Connector answering from a canned verdict, for tests and dry runs.
pub struct MockConnector {
    verdict: Option<RelevanceVerdict>,
}

impl MockConnector {
    pub fn accepting(verdict: RelevanceVerdict) -> Self {
        Self {
            verdict: Some(verdict),
        }
    }

    pub fn failing() -> Self {
        Self { verdict: None }
    }
}

#[async_trait]
impl RelevanceConnector for MockConnector {
    fn connector_name(&self) -> String {
        "mock".to_string()
    }

    async fn submit(&self, _articles: &[Article], _topic_label: &str) -> Result<RelevanceVerdict> {
        self.verdict
            .clone()
            .ok_or_else(|| CollectorError::Relevance("mock connector configured to fail".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let output = "Here you go:\n```json\n{\"articles\": [{\"id\": \"0\", \"summary\": \"s\", \"importance\": \"high\"}]}\n```";
        let verdict = extract_verdict(output, "CLI").unwrap();
        assert_eq!(verdict.articles.len(), 1);
        assert_eq!(verdict.articles[0].importance, Some(Importance::High));
    }

    #[test]
    fn test_legacy_field_names() {
        let output = r#"{"articles": [{"id": "1", "summary_ja": "要約"}],
                         "excluded": [{"id": "0", "title_ja": "タイトル"}]}"#;
        let verdict = extract_verdict(output, "API").unwrap();
        assert_eq!(verdict.articles[0].summary, "要約");
        assert_eq!(verdict.articles[0].importance, None);
        assert_eq!(verdict.localized_title("0"), Some("タイトル"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(extract_verdict("I could not decide.", "CLI").is_err());
        assert!(extract_verdict("{not json}", "CLI").is_err());
        assert!(extract_verdict("{}", "CLI").is_err());
    }

    #[test]
    fn test_preview_respects_char_boundary() {
        let text = "記".repeat(300);
        assert!(preview(&text).len() <= 500);
    }

    #[test]
    fn test_importance_labels_are_lenient() {
        let output = r#"{"articles": [
            {"id": "0", "summary": "a", "importance": "HIGH"},
            {"id": "1", "summary": "b", "importance": "critical"},
            {"id": "2", "summary": "c", "importance": null}
        ]}"#;
        let verdict = extract_verdict(output, "CLI").unwrap();
        let importances: Vec<_> = verdict.articles.iter().map(|a| a.importance).collect();
        assert_eq!(importances, vec![Some(Importance::High), None, None]);
    }
}
