use crate::types::{Article, Language, Provenance, RawRecord};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::debug;
use url::Url;

/// Naive layouts accepted after the offset-aware parsers have failed.
/// Matches are assumed to be UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S GMT",
    "%a, %d %b %Y %H:%M:%S UTC",
    "%a, %d %b %Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a publish date from a feed or API.
///
/// RFC 2822 and RFC 3339 strings keep their offset; the naive layouts in
/// `NAIVE_FORMATS` are read as UTC. Anything else is `None` rather than a
/// guess.
pub fn parse_published(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    // RFC 3339 without the colon in the offset, e.g. 2025-06-10T08:00:00+0900
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }

    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
    })
}

/// Turn one adapter record into an `Article`.
///
/// Records without a title or an absolute url are dropped here; an
/// unparseable date is kept as `None` and left to the time-window filter.
pub fn normalize(record: RawRecord) -> Option<Article> {
    let title = record.title.as_deref().map(str::trim).unwrap_or_default();
    let url = record.url.as_deref().map(str::trim).unwrap_or_default();

    if title.is_empty() || url.is_empty() {
        debug!("Dropping record without title or url: {:?}", record.title);
        return None;
    }
    if let Err(e) = Url::parse(url) {
        debug!("Dropping '{}' with unparseable url {:?}: {}", title, url, e);
        return None;
    }

    let published = record.published.as_deref().and_then(parse_published);
    if published.is_none() {
        debug!("Unparseable publish date for '{}': {:?}", title, record.published);
    }

    let mut article = Article::new(
        title,
        url,
        published,
        record.source.unwrap_or_default().trim(),
        record.language.unwrap_or(Language::En),
        record.provenance.unwrap_or(Provenance::GoogleNews),
    );
    article.external_ref = record.external_ref;
    article.score = record.score;

    Some(article)
}

/// Normalize a whole batch, preserving arrival order.
pub fn normalize_all(records: Vec<RawRecord>) -> Vec<Article> {
    let total = records.len();
    let articles: Vec<Article> = records.into_iter().filter_map(normalize).collect();

    if articles.len() < total {
        debug!("Normalizer dropped {} of {} records", total - articles.len(), total);
    }
    articles
}
