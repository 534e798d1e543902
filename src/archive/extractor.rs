//! DOM extraction of article fields from one fetched page

use crate::archive::CompletionIndex;
use crate::config::MissingMetaPolicy;
use crate::site::ArticleId;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

const CONTAINER: &str = "#content article";
const TITLE: &str = "h1.entry-title";
const CONTENT: &str = "div.entry-content";
const PUBLISH_DATE: &str = "time.entry-date";
const CATEGORY: &str = r#"[rel="category tag"]"#;
const TAG: &str = r#"[rel="tag"]"#;

/// Structured fields pulled out of an article page
///
/// `image_sources` carries the ordered `src` attribute values of the content
/// block's `<img>` elements (a missing attribute becomes an empty string),
/// so the image downloader never has to re-parse HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleFields {
    pub title: String,
    pub content_html: String,
    pub category: String,
    pub tags: Vec<String>,
    pub published: String,
    pub image_sources: Vec<String>,
}

/// Terminal outcome of extracting one page
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    Extracted(ArticleFields),
    Skipped(SkipReason),
}

/// Why a page was skipped without persisting anything
///
/// A skip is fully retryable on the next run; no marker is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoContainer,
    NoTitle,
    NoContent,
    AlreadyArchived,
    NoPublishDate,
    NoCategory,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoContainer => "no article container",
            Self::NoTitle => "no title",
            Self::NoContent => "no content",
            Self::AlreadyArchived => "already fetched",
            Self::NoPublishDate => "no publish date",
            Self::NoCategory => "no category",
        };
        write!(f, "{}", reason)
    }
}

/// Parses a fetched page's DOM into structured article fields
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    missing_meta: MissingMetaPolicy,
}

impl ArticleExtractor {
    pub fn new(missing_meta: MissingMetaPolicy) -> Self {
        Self { missing_meta }
    }

    /// Runs the extraction state machine over one page
    ///
    /// The container, title and content probes come first; the completion
    /// marker re-check follows them (a defensive repeat of the admission
    /// lookup, for pages that were already in flight when the marker
    /// appeared); the metadata probes run last under the site profile's
    /// missing-metadata policy.
    pub fn extract(
        &self,
        html: &str,
        article_id: ArticleId,
        completion: &CompletionIndex,
    ) -> ExtractOutcome {
        let document = Html::parse_document(html);

        let Some(container) = select_first(&document, CONTAINER) else {
            return ExtractOutcome::Skipped(SkipReason::NoContainer);
        };

        let Some(title_el) = select_in(container, TITLE) else {
            return ExtractOutcome::Skipped(SkipReason::NoTitle);
        };
        let title = element_text(title_el);

        let Some(content_el) = select_in(container, CONTENT) else {
            return ExtractOutcome::Skipped(SkipReason::NoContent);
        };

        if completion.is_complete(article_id) {
            return ExtractOutcome::Skipped(SkipReason::AlreadyArchived);
        }

        let published = select_first(&document, PUBLISH_DATE)
            .and_then(|el| el.value().attr("datetime"))
            .map(str::to_string);
        let published = match (published, self.missing_meta) {
            (Some(date), _) => date,
            (None, MissingMetaPolicy::AllowEmpty) => String::new(),
            (None, MissingMetaPolicy::Skip) => {
                return ExtractOutcome::Skipped(SkipReason::NoPublishDate);
            }
        };

        let category = select_first(&document, CATEGORY).map(element_text);
        let category = match (category, self.missing_meta) {
            (Some(category), _) => category,
            (None, MissingMetaPolicy::AllowEmpty) => String::new(),
            (None, MissingMetaPolicy::Skip) => {
                return ExtractOutcome::Skipped(SkipReason::NoCategory);
            }
        };

        let tags = document.select(&selector(TAG)).map(element_text).collect();

        let image_sources = content_el
            .select(&selector("img"))
            .map(|img| img.value().attr("src").unwrap_or("").to_string())
            .collect();

        ExtractOutcome::Extracted(ArticleFields {
            title,
            content_html: content_el.inner_html(),
            category,
            tags,
            published,
            image_sources,
        })
    }
}

/// Parses a fixed selector literal
fn selector(css: &str) -> Selector {
    match Selector::parse(css) {
        Ok(sel) => sel,
        Err(_) => unreachable!("invalid static selector: {}", css),
    }
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    document.select(&selector(css)).next()
}

fn select_in<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    scope.select(&selector(css)).next()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
