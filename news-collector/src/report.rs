use crate::collector::TopicOutcome;
use crate::types::{Article, Importance, Language, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Japan Standard Time, the zone reports are dated in.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("JST offset is in range")
}

#[derive(Debug, Serialize)]
pub struct ReportArticle {
    pub title: String,
    pub url: String,
    pub published: String,
    pub source: String,
    pub lang: Language,
    pub summary: String,
    pub importance: Option<Importance>,
    pub hn_url: Option<String>,
}

impl From<&Article> for ReportArticle {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            published: article.published_display(),
            source: article.source.clone(),
            lang: article.language,
            summary: article.summary.clone().unwrap_or_default(),
            importance: article.importance,
            hn_url: article.external_ref.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub total_fetched: usize,
    pub after_filter: usize,
    pub selected_en: usize,
    pub selected_ja: usize,
    pub excluded: usize,
    pub excluded_reasons: String,
    pub relevance_failed: bool,
}

/// Machine-readable record of one topic's run.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub topic: String,
    pub label: String,
    pub date: String,
    pub collected_at: String,
    pub highlights: String,
    pub articles_en: Vec<ReportArticle>,
    pub articles_ja: Vec<ReportArticle>,
    pub meta: ReportMeta,
}

/// Renders a topic outcome as Markdown and JSON.
pub struct ReportRenderer<'a> {
    outcome: &'a TopicOutcome,
    date: &'a str,
    collected_at: DateTime<FixedOffset>,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(outcome: &'a TopicOutcome, date: &'a str, collected_at: DateTime<Utc>) -> Self {
        Self {
            outcome,
            date,
            collected_at: collected_at.with_timezone(&jst()),
        }
    }

    fn by_language(&self, language: Language) -> Vec<&'a Article> {
        self.outcome
            .selected
            .iter()
            .filter(|article| article.language == language)
            .collect()
    }

    fn highlights(&self) -> &'a str {
        self.outcome
            .verdict
            .as_ref()
            .and_then(|verdict| verdict.highlights.as_deref())
            .unwrap_or("")
    }

    fn excluded_reasons(&self) -> &'a str {
        self.outcome
            .verdict
            .as_ref()
            .and_then(|verdict| verdict.excluded_reasons.as_deref())
            .unwrap_or("")
    }

    fn collected_at_display(&self) -> String {
        self.collected_at.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn to_json(&self) -> JsonReport {
        let articles_en: Vec<ReportArticle> =
            self.by_language(Language::En).into_iter().map(ReportArticle::from).collect();
        let articles_ja: Vec<ReportArticle> =
            self.by_language(Language::Ja).into_iter().map(ReportArticle::from).collect();

        JsonReport {
            topic: self.outcome.topic_id.clone(),
            label: self.outcome.label.clone(),
            date: self.date.to_string(),
            collected_at: self.collected_at_display(),
            highlights: self.highlights().to_string(),
            meta: ReportMeta {
                total_fetched: self.outcome.total_fetched,
                after_filter: self.outcome.total_after_filter,
                selected_en: articles_en.len(),
                selected_ja: articles_ja.len(),
                excluded: self.outcome.excluded.len(),
                excluded_reasons: self.excluded_reasons().to_string(),
                relevance_failed: self.outcome.relevance_failed,
            },
            articles_en,
            articles_ja,
        }
    }

    pub fn to_markdown(&self) -> String {
        let en = self.by_language(Language::En);
        let ja = self.by_language(Language::Ja);
        let mut md = String::new();

        let _ = writeln!(md, "# {} - {}", self.outcome.label, self.date);
        md.push('\n');
        let _ = writeln!(md, "> Collected: {} JST", self.collected_at_display());
        md.push_str("> Window: last 24 hours\n\n");
        let _ = writeln!(md, "- [Japanese News ({})](#japanese-news)", ja.len());
        let _ = writeln!(md, "- [English News ({})](#english-news)", en.len());
        md.push('\n');

        md.push_str("## Japanese News\n\n");
        write_section(&mut md, &ja, false);

        md.push_str("## English News\n\n");
        write_section(&mut md, &en, true);

        let highlights = self.highlights();
        if !highlights.is_empty() {
            md.push_str("## Highlights\n\n");
            md.push_str(highlights);
            md.push_str("\n\n");
        }

        if !self.outcome.excluded.is_empty() {
            md.push_str("## Excluded Articles\n\n");
            for article in &self.outcome.excluded {
                let localized = article.id.as_deref().and_then(|id| {
                    self.outcome
                        .verdict
                        .as_ref()
                        .and_then(|verdict| verdict.localized_title(id))
                });
                let _ = writeln!(md, "- {}", localized.unwrap_or(&article.title));
                let _ = writeln!(md, "  {}", article.url);
            }
            md.push('\n');
        }

        md.push_str("## Collection Info\n\n");
        let _ = writeln!(md, "- Fetched (before filtering): {}", self.outcome.total_fetched);
        let _ = writeln!(md, "- After date and duplicate filtering: {}", self.outcome.total_after_filter);
        let _ = writeln!(md, "- Listed: {} English / {} Japanese", en.len(), ja.len());
        let _ = writeln!(md, "- Excluded by relevance review: {}", self.outcome.excluded.len());
        if self.outcome.relevance_failed {
            md.push_str("- Relevance review failed; articles are listed without summaries\n");
        }
        let reasons = self.excluded_reasons();
        if !reasons.is_empty() {
            let _ = writeln!(md, "- Exclusion reasons: {}", reasons);
        }

        md
    }

    /// Write `<dir>/<topic>/<date>.md` and `.json`, returning both paths.
    pub fn write_to(&self, reports_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let output_dir = reports_dir.join(&self.outcome.topic_id);
        std::fs::create_dir_all(&output_dir)?;

        let md_path = output_dir.join(format!("{}.md", self.date));
        std::fs::write(&md_path, self.to_markdown())?;

        let json_path = output_dir.join(format!("{}.json", self.date));
        std::fs::write(&json_path, serde_json::to_string_pretty(&self.to_json())?)?;

        info!(
            "--- {} collection finished: {} / {} ---",
            self.outcome.topic_id,
            md_path.display(),
            json_path.display()
        );
        Ok((md_path, json_path))
    }
}

fn importance_badge(importance: Importance) -> &'static str {
    match importance {
        Importance::High => "🔴 HIGH",
        Importance::Medium => "🟡 MEDIUM",
        Importance::Low => "🔵 LOW",
    }
}

fn write_section(md: &mut String, articles: &[&Article], english: bool) {
    if articles.is_empty() {
        md.push_str("Nothing to report\n\n");
        return;
    }

    for (index, article) in articles.iter().enumerate() {
        let _ = writeln!(md, "### {}. [{}]({})", index + 1, article.title, article.url);
        if let Some(importance) = article.importance {
            let _ = writeln!(md, "- **Importance**: {}", importance_badge(importance));
        }
        let _ = writeln!(md, "- **Published**: {}", article.published_display());
        let _ = writeln!(md, "- **Source**: {}", article.source);
        if english {
            if let Some(hn_url) = &article.external_ref {
                let _ = writeln!(md, "- **HN**: {}", hn_url);
            }
        }
        if let Some(summary) = article.summary.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(md, "- **Summary**: {}", summary);
        }
        md.push('\n');
    }
}
