//! Link discovery for the frontier

use scraper::{Html, Selector};
use url::Url;

/// Extracts followable links from a fetched page
///
/// Collects `<a href>` targets resolved against the page URL. Script,
/// mail, telephone, and data links are dropped, as are fragment-only
/// anchors and anything that does not resolve to http(s). Admission
/// filtering happens later; this pass only decides what is a link at all.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&anchor_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            if let Some(link) = resolve_link(href, base_url) {
                links.push(link);
            }
        }
    }

    links
}

/// Resolves an href to an absolute URL, or drops it
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Same-page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/wp/1").unwrap()
    }

    #[test]
    fn test_absolute_link() {
        let html = r#"<a href="https://example.com/wp/2">next</a>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://example.com/wp/2");
    }

    #[test]
    fn test_relative_link_resolves() {
        let html = r#"<a href="/wp/3">third</a>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links[0].as_str(), "https://example.com/wp/3");
    }

    #[test]
    fn test_special_schemes_skipped() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@example.com">mail</a>
            <a href="tel:+123">tel</a>
            <a href="data:text/plain,x">data</a>
            <a href="#top">anchor</a>
        "##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_download_links_skipped() {
        let html = r#"<a href="/file.zip" download>zip</a>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_foreign_links_kept_for_admission() {
        // Cross-site links survive this pass; admission denies them later
        let html = r#"<a href="https://other.com/page">elsewhere</a>"#;
        assert_eq!(extract_links(html, &base_url()).len(), 1);
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"<a href="/wp/9">a</a><a href="/wp/4">b</a>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links[0].path(), "/wp/9");
        assert_eq!(links[1].path(), "/wp/4");
    }
}
