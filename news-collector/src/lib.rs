pub mod types;
pub mod traits;
pub mod normalizer;
pub mod filters;
pub mod dedup;
pub mod relevance;
pub mod merge;
pub mod sources;
pub mod collector;
pub mod config;
pub mod report;
pub mod run_output;

pub use types::*;
pub use traits::ArticleSource;
pub use dedup::Deduplicator;
pub use merge::{merge_results, MergeOutcome};
pub use relevance::{RelevanceConnector, RelevanceVerdict};
pub use collector::{TopicCollector, TopicOutcome};
pub use config::{CollectorConfig, TopicConfig};
pub use report::ReportRenderer;
