#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use news_collector::{Article, Language, Provenance};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed collection instant used across tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<FixedOffset> {
    (now() - chrono::Duration::hours(hours)).fixed_offset()
}

pub fn article(title: &str) -> Article {
    Article::new(
        title,
        format!("https://example.com/{}", title.len()),
        Some(hours_ago(1)),
        "Example",
        Language::En,
        Provenance::GoogleNews,
    )
}

pub fn titles(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.title.as_str()).collect()
}
