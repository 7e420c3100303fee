use crate::types::Article;
use chrono::{DateTime, Duration, TimeZone};
use tracing::debug;

/// Keep articles published at or after `now - lookback`.
///
/// Articles without a parseable publish time are always dropped.
pub fn filter_by_window<Tz: TimeZone>(
    articles: Vec<Article>,
    now: &DateTime<Tz>,
    lookback: Duration,
) -> Vec<Article> {
    let since = now.clone() - lookback;
    let before = articles.len();

    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|article| match &article.published {
            Some(published) => *published >= since,
            None => false,
        })
        .collect();

    debug!("Time window kept {}/{} articles", kept.len(), before);
    kept
}

/// Drop articles whose title contains any denylist term, ignoring case.
pub fn filter_excluded_keywords(articles: Vec<Article>, exclude: &[String]) -> Vec<Article> {
    if exclude.is_empty() {
        return articles;
    }

    // Blank terms would match every title.
    let terms: Vec<String> = exclude
        .iter()
        .map(|term| term.to_lowercase())
        .filter(|term| !term.is_empty())
        .collect();
    let before = articles.len();

    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|article| {
            let title = article.title.to_lowercase();
            !terms.iter().any(|term| title.contains(term.as_str()))
        })
        .collect();

    debug!("Exclusion filter kept {}/{} articles", kept.len(), before);
    kept
}
