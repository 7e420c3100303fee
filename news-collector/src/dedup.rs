use crate::types::Article;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Similarity above which two titles count as the same story.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Lowercased set of word tokens in a title.
pub fn tokenize(title: &str) -> HashSet<String> {
    let lowered = title.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Jaccard similarity of two token sets; 0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Greedy near-duplicate removal over article titles.
///
/// Input order is precedence: an article is dropped when its title is more
/// than `threshold` similar to any title kept so far. Only kept titles act
/// as anchors; a dropped title is never compared against again.
#[derive(Debug)]
pub struct Deduplicator {
    threshold: f64,
    kept: Vec<HashSet<String>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::with_threshold(SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            kept: Vec::new(),
        }
    }

    /// Returns `true` when the title was kept and recorded.
    pub fn admit(&mut self, title: &str) -> bool {
        let tokens = tokenize(title);
        let duplicate = self
            .kept
            .iter()
            .any(|seen| jaccard(&tokens, seen) > self.threshold);

        if duplicate {
            debug!("Dropping near-duplicate title: {}", title);
            return false;
        }
        self.kept.push(tokens);
        true
    }

    pub fn deduplicate(&mut self, articles: Vec<Article>) -> Vec<Article> {
        let before = articles.len();
        let unique: Vec<Article> = articles
            .into_iter()
            .filter(|article| self.admit(&article.title))
            .collect();

        if unique.len() < before {
            debug!("Removed {} near-duplicate articles", before - unique.len());
        }
        unique
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Deduplicate a batch with the default threshold.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    Deduplicator::new().deduplicate(articles)
}
