use super::{extract_verdict, PromptTemplate, RelevanceConnector, RelevanceVerdict};
use crate::types::{Article, CollectorError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 32768;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Relevance transport that calls the Anthropic Messages API directly.
pub struct AnthropicApiConnector {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    template: PromptTemplate,
}

impl AnthropicApiConnector {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, template: PromptTemplate) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(CollectorError::Http)?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            template,
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| CollectorError::Config(format!("invalid API key header: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/messages", self.base_url);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Messages API request (model={})", self.model);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Messages API call failed ({}): {}", status, body);
            return Err(CollectorError::Relevance(format!("Messages API error ({}): {}", status, body)));
        }

        let response: MessagesResponse = response.json().await?;
        if response.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Messages API response truncated (max_tokens={})", MAX_TOKENS);
        }

        let text = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(text.trim().to_string())
    }
}

impl fmt::Debug for AnthropicApiConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicApiConnector")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl RelevanceConnector for AnthropicApiConnector {
    fn connector_name(&self) -> String {
        format!("API ({})", self.model)
    }

    async fn submit(&self, articles: &[Article], topic_label: &str) -> Result<RelevanceVerdict> {
        let prompt = self.template.render(articles, topic_label)?;
        info!("Submitting {} articles to Messages API", articles.len());

        let output = self.complete(&prompt).await?;
        extract_verdict(&output, "API")
    }
}
