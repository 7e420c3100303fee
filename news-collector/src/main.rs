use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use news_collector::config::{resolve_path, CollectorConfig, CONFIG_ENV, REPORTS_DIR_ENV};
use news_collector::relevance::{connector_from_env, PromptTemplate};
use news_collector::report::{jst, ReportRenderer};
use news_collector::run_output::{RunSummary, GITHUB_OUTPUT_ENV};
use news_collector::{FetchConfig, PipelineSettings, TopicCollector};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Collect the last day's news for configured topics and write digests.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Topic id, a comma-separated list of ids, or "all"
    topic: String,

    /// Report date (defaults to today in JST)
    #[arg(long)]
    date: Option<String>,

    /// Topics file (overrides DAILY_NEWS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory (overrides DAILY_NEWS_REPORTS_DIR)
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Prompt template used for the relevance review
    #[arg(long)]
    prompt_template: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("news_collector=info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one topic could not be written.
async fn run(args: Args) -> anyhow::Result<bool> {
    let config_path = resolve_path(args.config, CONFIG_ENV, "config.json");
    let reports_dir = resolve_path(args.reports_dir, REPORTS_DIR_ENV, "reports");

    let config = CollectorConfig::load(&config_path)?;
    let topic_ids = config.select_topics(&args.topic)?;

    let template = match &args.prompt_template {
        Some(path) => PromptTemplate::from_file(path)?,
        None => PromptTemplate::default(),
    };
    let date = args
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&jst()).format("%Y-%m-%d").to_string());

    let collector = TopicCollector::new(
        FetchConfig::default(),
        PipelineSettings::default(),
        connector_from_env(template)?,
    );

    let mut summary = RunSummary::default();
    let mut all_written = true;

    for topic_id in &topic_ids {
        let topic = &config.topics[topic_id];
        let now = Utc::now();

        let outcome = match collector.collect(topic_id, topic, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Topic {} failed: {}", topic_id, e);
                all_written = false;
                continue;
            }
        };

        match ReportRenderer::new(&outcome, &date, now).write_to(&reports_dir) {
            Ok((md_path, json_path)) => summary.record(topic_id, md_path, json_path),
            Err(e) => {
                error!("Failed to write report for {}: {}", topic_id, e);
                all_written = false;
            }
        }
    }

    if let Some(output_file) = std::env::var_os(GITHUB_OUTPUT_ENV) {
        summary
            .append_to(&PathBuf::from(output_file), &reports_dir)
            .context("writing GITHUB_OUTPUT")?;
    }

    info!("Collected {}/{} topics", summary.topics.len(), topic_ids.len());
    Ok(all_written)
}
