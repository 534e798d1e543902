//! Crawl admission: which discovered URLs the engine may fetch at all

use crate::archive::CompletionIndex;
use crate::site::{path_and_query, ArticleIdExtractor};
use std::fmt;
use url::Url;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The engine may fetch this URL
    Allow,
    /// The engine must not fetch this URL
    Deny(DenyReason),
}

/// Why a URL was pruned from the frontier
///
/// A denial is a frontier decision, not an error; it is logged and counted,
/// never propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// URL authority differs from the root's
    ForeignAuthority,
    /// Tag listing page
    TagPage,
    /// Language-switch variant of a page
    LangPage,
    /// Community / bulletin-board section
    BbsPage,
    /// Ad section
    AdPage,
    /// Author listing page
    AuthorPage,
    /// About page
    AboutPage,
    /// Completion marker already exists for this article
    AlreadyArchived,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ForeignAuthority => "invalid authority",
            Self::TagPage => "tag page",
            Self::LangPage => "lang page",
            Self::BbsPage => "bbs page",
            Self::AdPage => "ad page",
            Self::AuthorPage => "author page",
            Self::AboutPage => "about page",
            Self::AlreadyArchived => "already crawled",
        };
        write!(f, "{}", reason)
    }
}

/// Decides whether a discovered URL should be fetched
///
/// The rules are substring filters tuned to the one target site's URL
/// taxonomy, evaluated short-circuit in a fixed order, with the
/// incremental-rerun check (completion marker lookup) last. The check is
/// side-effect-free: a pure function of the URL and the on-disk marker
/// state, safe to call from concurrent workers.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    authority: String,
    ids: ArticleIdExtractor,
    completion: CompletionIndex,
}

impl AdmissionPolicy {
    pub fn new(root_url: &Url, ids: ArticleIdExtractor, completion: CompletionIndex) -> Self {
        Self {
            authority: root_url.authority().to_string(),
            ids,
            completion,
        }
    }

    /// Evaluates the admission rules for one URL, first match wins
    pub fn admit(&self, url: &Url) -> Admission {
        if url.authority() != self.authority {
            return Admission::Deny(DenyReason::ForeignAuthority);
        }

        let target = path_and_query(url);

        if target.contains("tag") {
            return Admission::Deny(DenyReason::TagPage);
        }
        if target.contains("lang=") {
            return Admission::Deny(DenyReason::LangPage);
        }
        if target.contains("/community") || target.contains("/bbs") {
            return Admission::Deny(DenyReason::BbsPage);
        }
        if target.contains("/wp2") {
            return Admission::Deny(DenyReason::AdPage);
        }
        if target.contains("/author") {
            return Admission::Deny(DenyReason::AuthorPage);
        }
        if target.contains("/about.html") {
            return Admission::Deny(DenyReason::AboutPage);
        }

        // Advisory incremental check: failing to extract an id is not a
        // denial; the page processor skips non-articles downstream.
        if let Some(id) = self.ids.extract(url) {
            if self.completion.is_complete(id) {
                return Admission::Deny(DenyReason::AlreadyArchived);
            }
        }

        Admission::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdPattern;
    use crate::site::ArticleId;
    use tempfile::TempDir;

    fn create_policy(root: &TempDir) -> AdmissionPolicy {
        let root_url = Url::parse("https://example.com/").unwrap();
        AdmissionPolicy::new(
            &root_url,
            ArticleIdExtractor::new(IdPattern::WpPath),
            CompletionIndex::new(root.path()),
        )
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_foreign_authority_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://other.com/wp/1")),
            Admission::Deny(DenyReason::ForeignAuthority)
        );
    }

    #[test]
    fn test_authority_includes_port() {
        let dir = TempDir::new().unwrap();
        let root_url = Url::parse("http://example.com:8080/").unwrap();
        let policy = AdmissionPolicy::new(
            &root_url,
            ArticleIdExtractor::new(IdPattern::WpPath),
            CompletionIndex::new(dir.path()),
        );
        assert_eq!(
            policy.admit(&url("http://example.com:8080/wp/1")),
            Admission::Allow
        );
        assert_eq!(
            policy.admit(&url("http://example.com/wp/1")),
            Admission::Deny(DenyReason::ForeignAuthority)
        );
    }

    #[test]
    fn test_tag_page_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/tag/news")),
            Admission::Deny(DenyReason::TagPage)
        );
    }

    #[test]
    fn test_tag_substring_matches_anywhere() {
        // "tag" is a plain substring filter, not a path segment match
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/wp/vintage-radio")),
            Admission::Deny(DenyReason::TagPage)
        );
    }

    #[test]
    fn test_lang_page_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/wp/1?lang=en")),
            Admission::Deny(DenyReason::LangPage)
        );
    }

    #[test]
    fn test_bbs_pages_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/community/list")),
            Admission::Deny(DenyReason::BbsPage)
        );
        assert_eq!(
            policy.admit(&url("https://example.com/bbs/42")),
            Admission::Deny(DenyReason::BbsPage)
        );
    }

    #[test]
    fn test_ad_page_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/wp2/9")),
            Admission::Deny(DenyReason::AdPage)
        );
    }

    #[test]
    fn test_author_page_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/author/alex")),
            Admission::Deny(DenyReason::AuthorPage)
        );
    }

    #[test]
    fn test_about_page_denied() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/about.html")),
            Admission::Deny(DenyReason::AboutPage)
        );
    }

    #[test]
    fn test_article_page_allowed() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(policy.admit(&url("https://example.com/wp/77")), Admission::Allow);
    }

    #[test]
    fn test_no_id_falls_through_to_allow() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);
        assert_eq!(policy.admit(&url("https://example.com/news/77")), Admission::Allow);
    }

    #[test]
    fn test_completed_article_denied() {
        let dir = TempDir::new().unwrap();
        let completion = CompletionIndex::new(dir.path());
        let article_dir = completion.article_dir(ArticleId::new(77));
        std::fs::create_dir_all(&article_dir).unwrap();
        std::fs::write(article_dir.join("index.json"), "{}").unwrap();

        let policy = create_policy(&dir);
        assert_eq!(
            policy.admit(&url("https://example.com/wp/77")),
            Admission::Deny(DenyReason::AlreadyArchived)
        );
        // A different article is still admitted
        assert_eq!(policy.admit(&url("https://example.com/wp/78")), Admission::Allow);
    }

    #[test]
    fn test_rule_order_earliest_wins() {
        let dir = TempDir::new().unwrap();
        let policy = create_policy(&dir);

        // Foreign authority beats the tag filter
        assert_eq!(
            policy.admit(&url("https://other.com/tag/news")),
            Admission::Deny(DenyReason::ForeignAuthority)
        );
        // Tag beats lang
        assert_eq!(
            policy.admit(&url("https://example.com/tag/news?lang=en")),
            Admission::Deny(DenyReason::TagPage)
        );
        // Lang beats bbs
        assert_eq!(
            policy.admit(&url("https://example.com/bbs/1?lang=en")),
            Admission::Deny(DenyReason::LangPage)
        );
        // Bbs beats author
        assert_eq!(
            policy.admit(&url("https://example.com/bbs/author/alex")),
            Admission::Deny(DenyReason::BbsPage)
        );
    }

    #[test]
    fn test_deny_reason_strings() {
        assert_eq!(DenyReason::ForeignAuthority.to_string(), "invalid authority");
        assert_eq!(DenyReason::TagPage.to_string(), "tag page");
        assert_eq!(DenyReason::LangPage.to_string(), "lang page");
        assert_eq!(DenyReason::BbsPage.to_string(), "bbs page");
        assert_eq!(DenyReason::AdPage.to_string(), "ad page");
        assert_eq!(DenyReason::AuthorPage.to_string(), "author page");
        assert_eq!(DenyReason::AboutPage.to_string(), "about page");
        assert_eq!(DenyReason::AlreadyArchived.to_string(), "already crawled");
    }
}
