use super::{extract_verdict, PromptTemplate, RelevanceConnector, RelevanceVerdict};
use crate::types::{Article, CollectorError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Environment variable the `claude` binary uses to detect a nested session.
const NESTED_SESSION_VAR: &str = "CLAUDECODE";

/// Relevance transport that pipes the prompt into a local `claude -p`.
pub struct ClaudeCliConnector {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    template: PromptTemplate,
}

impl ClaudeCliConnector {
    pub fn new(template: PromptTemplate) -> Self {
        Self {
            program: "claude".to_string(),
            args: vec!["-p".to_string()],
            timeout: Duration::from_secs(120),
            template,
        }
    }

    /// Run a different command line instead of `claude -p`.
    pub fn with_command(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, prompt: String) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env_remove(NESTED_SESSION_VAR)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    error!("{} command not found", self.program);
                    CollectorError::Relevance(format!("{} command not found", self.program))
                } else {
                    CollectorError::Io(e)
                }
            })?;

        let stdin = child.stdin.take();
        let exchange = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                // Closing stdin tells the model the prompt is complete.
                drop(stdin);
            }
            child.wait_with_output().await
        };

        // Dropping the exchange on timeout kills the child.
        let output = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(output) => output?,
            Err(_) => {
                error!("{} timed out after {:?}", self.program, self.timeout);
                return Err(CollectorError::Timeout {
                    what: format!("{} {}", self.program, self.args.join(" ")),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            debug!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl RelevanceConnector for ClaudeCliConnector {
    fn connector_name(&self) -> String {
        format!("CLI ({})", self.program)
    }

    async fn submit(&self, articles: &[Article], topic_label: &str) -> Result<RelevanceVerdict> {
        let prompt = self.template.render(articles, topic_label)?;
        info!("Submitting {} articles to {} {}", articles.len(), self.program, self.args.join(" "));

        let output = self.run(prompt).await?;
        extract_verdict(&output, "CLI")
    }
}
