//! Article-id derivation from page URLs

use crate::config::IdPattern;
use crate::site::path_and_query;
use regex::Regex;
use std::fmt;
use url::Url;

/// Stable numeric identifier of an article, used as its directory key
///
/// Derived once per URL; not guaranteed stable across site redesigns, which
/// is why the pattern is a named site-profile choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleId(u64);

impl ArticleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives article ids from URLs via the site profile's pattern
#[derive(Debug, Clone)]
pub struct ArticleIdExtractor {
    pattern: Regex,
}

impl ArticleIdExtractor {
    /// Builds the extractor for a named id pattern
    pub fn new(pattern: IdPattern) -> Self {
        let pattern = match pattern {
            // The numeric segment following the /wp/ path marker
            IdPattern::WpPath => Regex::new(r"/wp/(\d+)"),
            // The numeric segment immediately preceding a .html suffix
            IdPattern::HtmlSuffix => Regex::new(r"/(\d+)\.html"),
        };
        // Both patterns are fixed literals; compilation cannot fail
        let pattern = match pattern {
            Ok(re) => re,
            Err(_) => unreachable!("static id pattern failed to compile"),
        };
        Self { pattern }
    }

    /// Extracts the article id from a URL's path-and-query
    ///
    /// Returns `None` when the pattern does not match or the captured digits
    /// do not fit a `u64`. Callers treat `None` as "not an article page" and
    /// skip silently; it is never an error.
    pub fn extract(&self, url: &Url) -> Option<ArticleId> {
        let target = path_and_query(url);
        let captures = self.pattern.captures(&target)?;
        let digits = captures.get(1)?.as_str();
        digits.parse::<u64>().ok().map(ArticleId::new)
    }
}
