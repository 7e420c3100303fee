mod common;

use common::{article, hours_ago, init_tracing, now, titles};
use chrono::Duration;
use news_collector::dedup::{deduplicate, jaccard, tokenize};
use news_collector::filters::{filter_by_window, filter_excluded_keywords};
use news_collector::merge::{assign_ids, merge_results};
use news_collector::relevance::{AcceptedArticle, MockConnector, RejectedArticle, RelevanceVerdict};
use news_collector::{
    Deduplicator, FetchConfig, Importance, Language, PipelineSettings, Provenance, RawRecord,
    TopicCollector, TopicConfig,
};

#[test]
fn test_case_and_punctuation_duplicates_collapse() {
    init_tracing();

    let articles = vec![
        article("Company X raises funding for new AI product"),
        article("Company X raises funding for new ai product!!"),
    ];
    let unique = deduplicate(articles);

    assert_eq!(titles(&unique), vec!["Company X raises funding for new AI product"]);
}

#[test]
fn test_unrelated_titles_are_kept() {
    let articles = vec![
        article("Senate passes new privacy law"),
        article("Tech giant releases quarterly earnings"),
    ];
    assert_eq!(deduplicate(articles).len(), 2);
}

#[test]
fn test_threshold_is_strict() {
    // 3 shared of 5 distinct tokens: exactly 0.6, not a duplicate
    let at_threshold = vec![
        article("alpha beta gamma delta"),
        article("alpha beta gamma epsilon"),
    ];
    assert_eq!(deduplicate(at_threshold).len(), 2);

    // 4 shared of 6 distinct tokens: above 0.6, later one dropped
    let above = vec![
        article("alpha beta gamma delta epsilon"),
        article("alpha beta gamma delta zeta"),
    ];
    assert_eq!(titles(&deduplicate(above)), vec!["alpha beta gamma delta epsilon"]);
}

#[test]
fn test_dropped_titles_are_not_anchors() {
    let articles = vec![
        article("w1 w2 w3 w4 w5"),
        // similar to the first: dropped
        article("w1 w2 w3 w4 w6"),
        // similar only to the dropped title: kept
        article("w1 w2 w3 w6 w7"),
    ];
    assert_eq!(titles(&deduplicate(articles)), vec!["w1 w2 w3 w4 w5", "w1 w2 w3 w6 w7"]);
}

#[test]
fn test_dedup_is_idempotent() {
    let articles = vec![
        article("OpenAI ships a new model"),
        article("OpenAI ships a new model today"),
        article("Regulators open antitrust probe"),
        article("Regulators open an antitrust probe"),
        article("!!!"),
        article("???"),
    ];
    let once = deduplicate(articles);
    let twice = deduplicate(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_symbol_only_titles_never_match() {
    assert_eq!(jaccard(&tokenize("!!!"), &tokenize("???")), 0.0);

    let mut dedup = Deduplicator::new();
    assert!(dedup.admit("!!!"));
    assert!(dedup.admit("!!!"));
}

#[test]
fn test_tokenize_handles_unicode_and_underscores() {
    let tokens = tokenize("Rust_lang 東京 AI, ai!");
    assert!(tokens.contains("rust_lang"));
    assert!(tokens.contains("東京"));
    assert!(tokens.contains("ai"));
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_window_boundary_is_inclusive() {
    let mut on_boundary = article("on boundary");
    on_boundary.published = Some(hours_ago(24));
    let mut just_outside = article("just outside");
    just_outside.published = Some(hours_ago(24) - Duration::seconds(1));
    let mut unknown = article("unknown date");
    unknown.published = None;
    let recent = article("recent");

    let kept = filter_by_window(
        vec![on_boundary, just_outside, unknown, recent],
        &now(),
        Duration::hours(24),
    );
    assert_eq!(titles(&kept), vec!["on boundary", "recent"]);

    let again = filter_by_window(kept.clone(), &now(), Duration::hours(24));
    assert_eq!(kept, again);
}

#[test]
fn test_exclusion_filter() {
    let articles = vec![article("Crypto prices surge"), article("AI prices surge")];

    let kept = filter_excluded_keywords(articles.clone(), &["crypto".to_string()]);
    assert_eq!(titles(&kept), vec!["AI prices surge"]);

    let untouched = filter_excluded_keywords(articles.clone(), &[]);
    assert_eq!(untouched, articles);

    // substring, not word match
    let kept = filter_excluded_keywords(articles, &["RICE".to_string()]);
    assert!(kept.is_empty());
}

fn tagged(titles: &[&str]) -> Vec<news_collector::Article> {
    let mut articles: Vec<_> = titles.iter().map(|t| article(t)).collect();
    assign_ids(&mut articles);
    articles
}

#[test]
fn test_merge_fallback_selects_everything() {
    let articles = tagged(&["first", "second", "third"]);
    let outcome = merge_results(articles.clone(), None);

    assert_eq!(titles(&outcome.selected), vec!["first", "second", "third"]);
    assert!(outcome.excluded.is_empty());
    assert!(outcome.selected.iter().all(|a| a.importance.is_none()));
    assert!(outcome.selected.iter().all(|a| a.summary.is_none()));
}

#[test]
fn test_merge_with_zero_accepted_falls_back() {
    let articles = tagged(&["first", "second"]);
    let verdict = RelevanceVerdict {
        excluded: vec![RejectedArticle {
            id: "0".to_string(),
            localized_title: "最初".to_string(),
        }],
        ..Default::default()
    };
    let outcome = merge_results(articles, Some(&verdict));

    assert_eq!(outcome.selected.len(), 2);
    assert!(outcome.excluded.is_empty());
}

fn accept(id: &str, importance: Option<Importance>) -> AcceptedArticle {
    AcceptedArticle {
        id: id.to_string(),
        summary: format!("summary {}", id),
        importance,
    }
}

#[test]
fn test_merge_ranks_accepted_articles() {
    let articles = tagged(&["article 0", "article 1", "article 2"]);
    let verdict = RelevanceVerdict {
        articles: vec![accept("2", Some(Importance::Low)), accept("0", Some(Importance::High))],
        ..Default::default()
    };
    let outcome = merge_results(articles, Some(&verdict));

    assert_eq!(titles(&outcome.selected), vec!["article 0", "article 2"]);
    assert_eq!(titles(&outcome.excluded), vec!["article 1"]);
    assert_eq!(outcome.selected[0].summary.as_deref(), Some("summary 0"));
    assert_eq!(outcome.excluded[0].summary, None);
}

#[test]
fn test_merge_defaults_to_medium_and_keeps_ties_in_order() {
    let articles = tagged(&["a", "b", "c", "d"]);
    let verdict = RelevanceVerdict {
        articles: vec![
            accept("0", Some(Importance::Low)),
            accept("1", None),
            accept("2", Some(Importance::Medium)),
            accept("3", Some(Importance::High)),
        ],
        ..Default::default()
    };
    let outcome = merge_results(articles, Some(&verdict));

    assert_eq!(titles(&outcome.selected), vec!["d", "b", "c", "a"]);
    assert_eq!(outcome.selected[1].importance, Some(Importance::Medium));
}

fn record(title: &str, hours: i64) -> RawRecord {
    RawRecord {
        title: Some(title.to_string()),
        url: Some(format!("https://news.example/{}", title.replace(' ', "-"))),
        published: Some(hours_ago(hours).to_rfc3339()),
        source: Some("Example".to_string()),
        language: Some(Language::En),
        provenance: Some(Provenance::GoogleNews),
        ..Default::default()
    }
}

fn topic() -> TopicConfig {
    TopicConfig {
        label: "AI".to_string(),
        keywords_en: Vec::new(),
        keywords_ja: Vec::new(),
        apis: Vec::new(),
        exclude_keywords: vec!["crypto".to_string()],
    }
}

fn sample_records() -> Vec<RawRecord> {
    vec![
        record("Lab releases open weights model", 2),
        record("Lab releases open weights model!", 3),
        record("Crypto exchange adds AI assistant", 1),
        record("Old story about chips", 48),
        RawRecord {
            title: None,
            ..record("", 1)
        },
        record("Chipmaker beats estimates", 5),
    ]
}

#[tokio::test]
async fn test_process_with_failing_connector() {
    init_tracing();

    let collector = TopicCollector::new(
        FetchConfig::default(),
        PipelineSettings::default(),
        Box::new(MockConnector::failing()),
    );
    let outcome = collector.process("ai", &topic(), sample_records(), now()).await;

    assert_eq!(outcome.total_fetched, 6);
    assert_eq!(outcome.total_after_filter, 2);
    assert!(outcome.relevance_failed);
    assert!(outcome.verdict.is_none());
    assert_eq!(
        titles(&outcome.selected),
        vec!["Lab releases open weights model", "Chipmaker beats estimates"]
    );
    assert_eq!(outcome.selected[1].id.as_deref(), Some("1"));
    assert!(outcome.excluded.is_empty());
}

#[tokio::test]
async fn test_process_with_verdict() {
    init_tracing();

    let verdict = RelevanceVerdict {
        articles: vec![accept("1", Some(Importance::High))],
        excluded: vec![RejectedArticle {
            id: "0".to_string(),
            localized_title: "研究所がモデルを公開".to_string(),
        }],
        highlights: Some("Chips day".to_string()),
        excluded_reasons: None,
    };
    let collector = TopicCollector::new(
        FetchConfig::default(),
        PipelineSettings::default(),
        Box::new(MockConnector::accepting(verdict)),
    );
    let outcome = collector.process("ai", &topic(), sample_records(), now()).await;

    assert!(!outcome.relevance_failed);
    assert_eq!(titles(&outcome.selected), vec!["Chipmaker beats estimates"]);
    assert_eq!(titles(&outcome.excluded), vec!["Lab releases open weights model"]);
}

#[tokio::test]
async fn test_process_skips_connector_when_nothing_survives() {
    let collector = TopicCollector::new(
        FetchConfig::default(),
        PipelineSettings::default(),
        Box::new(MockConnector::failing()),
    );
    let outcome = collector
        .process("ai", &topic(), vec![record("Old story", 72)], now())
        .await;

    assert_eq!(outcome.total_fetched, 1);
    assert_eq!(outcome.total_after_filter, 0);
    assert!(!outcome.relevance_failed);
    assert!(outcome.selected.is_empty());
}
