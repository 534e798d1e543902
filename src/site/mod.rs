//! Site-facing decisions: article-id derivation and crawl admission
//!
//! Everything here is a pure function of the URL (plus the on-disk
//! completion state for admission rule 8), so it is safe to call from any
//! number of concurrent workers.

mod admission;
mod id;

pub use admission::{Admission, AdmissionPolicy, DenyReason};
pub use id::{ArticleId, ArticleIdExtractor};

use url::Url;

/// Returns the path-and-query portion of a URL (`/wp/123?lang=en`)
///
/// All admission filters and id patterns operate on this slice of the URL.
pub(crate) fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query_with_query() {
        let url = Url::parse("https://example.com/wp/123?lang=en").unwrap();
        assert_eq!(path_and_query(&url), "/wp/123?lang=en");
    }

    #[test]
    fn test_path_and_query_without_query() {
        let url = Url::parse("https://example.com/wp/123").unwrap();
        assert_eq!(path_and_query(&url), "/wp/123");
    }
}
