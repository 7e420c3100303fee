use crate::relevance::{AcceptedArticle, RelevanceVerdict};
use crate::types::{Article, Importance};
use std::collections::HashMap;
use tracing::debug;

/// Final partition of a topic's articles.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Ranked by importance, high first.
    pub selected: Vec<Article>,
    pub excluded: Vec<Article>,
}

/// Give every article its per-run positional id ("0", "1", ...).
pub fn assign_ids(articles: &mut [Article]) {
    for (index, article) in articles.iter_mut().enumerate() {
        article.id = Some(index.to_string());
    }
}

/// Combine the relevance verdict with the deduplicated articles.
///
/// Without a verdict, or with one that accepts nothing, every article is
/// selected unsummarized and nothing is excluded.
pub fn merge_results(articles: Vec<Article>, verdict: Option<&RelevanceVerdict>) -> MergeOutcome {
    let accepted: HashMap<&str, &AcceptedArticle> = verdict
        .map(|verdict| {
            verdict
                .articles
                .iter()
                .map(|entry| (entry.id.as_str(), entry))
                .collect()
        })
        .unwrap_or_default();

    let mut outcome = MergeOutcome::default();

    if accepted.is_empty() {
        debug!("No accepted ids, selecting all {} articles", articles.len());
        outcome.selected = articles
            .into_iter()
            .map(|mut article| {
                article.summary = None;
                article.importance = None;
                article
            })
            .collect();
    } else {
        for mut article in articles {
            match article.id.as_deref().and_then(|id| accepted.get(id)) {
                Some(entry) => {
                    article.summary = Some(entry.summary.clone());
                    article.importance = Some(entry.importance.unwrap_or(Importance::Medium));
                    outcome.selected.push(article);
                }
                None => outcome.excluded.push(article),
            }
        }
    }

    // Vec::sort_by_key is stable, so equal ranks keep arrival order.
    outcome
        .selected
        .sort_by_key(|article| Importance::rank(article.importance));

    outcome
}
