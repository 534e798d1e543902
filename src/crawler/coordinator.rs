//! Main crawl loop
//!
//! Sequences the run: pop a URL from the frontier, pace, fetch, discover
//! links (admission-filtered at discovery time), then hand the page to the
//! processor and tally its outcome. Per-page failures are logged and
//! counted; only setup-level errors abort the run.

use crate::archive::{
    ArticleExtractor, ArticlePersister, ClaimRegistry, CompletionIndex, FetchedPage,
    ImageDownloader, PageProcessor,
};
use crate::config::{validate, ArchiveConfig};
use crate::crawler::fetcher::{build_image_client, build_page_client, fetch_page, FetchResult};
use crate::crawler::links::extract_links;
use crate::crawler::stats::{CrawlStats, CrawlSummary};
use crate::site::{Admission, AdmissionPolicy, ArticleIdExtractor};
use crate::Result;
use chrono::Utc;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// Drives one archive run over the target site
pub struct Coordinator {
    config: ArchiveConfig,
    admission: AdmissionPolicy,
    processor: PageProcessor,
    page_client: Client,
    frontier: VecDeque<Url>,
    visited: HashSet<String>,
    stats: CrawlStats,
    last_fetch: Option<Instant>,
}

impl Coordinator {
    /// Validates the configuration and assembles the pipeline
    ///
    /// Failures here (bad config, output root not creatable, client build)
    /// are process-fatal: nothing has been crawled yet and nothing partial
    /// exists to resume.
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        validate(&config)?;
        std::fs::create_dir_all(&config.output_dir)?;

        let page_client = build_page_client()?;
        let image_client = build_image_client(config.proxy.as_deref())?;

        let completion = CompletionIndex::new(&config.output_dir);
        let ids = ArticleIdExtractor::new(config.profile.id_pattern);
        let admission = AdmissionPolicy::new(&config.root_url, ids.clone(), completion.clone());

        let processor = PageProcessor::new(
            ids,
            ArticleExtractor::new(config.profile.missing_meta),
            ImageDownloader::new(
                image_client,
                config.proxy.is_some(),
                Duration::from_millis(config.image_delay_ms),
            ),
            ArticlePersister::new(&config.output_dir),
            completion,
            ClaimRegistry::new(),
        );

        let mut frontier = VecDeque::new();
        frontier.push_back(config.root_url.clone());
        let mut visited = HashSet::new();
        visited.insert(config.root_url.as_str().to_string());

        Ok(Self {
            config,
            admission,
            processor,
            page_client,
            frontier,
            visited,
            stats: CrawlStats::default(),
            last_fetch: None,
        })
    }

    /// Runs the crawl until the frontier is exhausted
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::info!("Starting crawl of {}", self.config.root_url);

        while let Some(url) = self.frontier.pop_front() {
            self.pace().await;
            tracing::info!("Fetching {}", url);

            let fetched = fetch_page(&self.page_client, &url).await;
            self.last_fetch = Some(Instant::now());

            let body = match fetched {
                FetchResult::Html { body, .. } => body,
                FetchResult::NotHtml { content_type } => {
                    tracing::debug!("Skipping {} (content-type {})", url, content_type);
                    continue;
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Fetch of {} failed: HTTP {}", url, status_code);
                    self.stats.fetch_failures += 1;
                    continue;
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Fetch of {} failed: {}", url, error);
                    self.stats.fetch_failures += 1;
                    continue;
                }
            };
            self.stats.pages_fetched += 1;

            self.enqueue_links(&body, &url);

            let page = FetchedPage {
                url: url.clone(),
                body,
            };
            match self.processor.process(&page).await {
                Ok(outcome) => self.stats.record_outcome(&outcome),
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", url, e);
                    self.stats.page_failures += 1;
                }
            }

            if self.stats.pages_fetched % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} articles archived, {} in frontier",
                    self.stats.pages_fetched,
                    self.stats.articles_persisted,
                    self.frontier.len()
                );
            }
        }

        let summary = CrawlSummary {
            root_url: self.config.root_url.clone(),
            started_at,
            elapsed: start.elapsed(),
            stats: self.stats.clone(),
        };
        tracing::info!(
            "Crawl complete: {} pages fetched, {} articles archived, {} aborted, {} denied",
            summary.stats.pages_fetched,
            summary.stats.articles_persisted,
            summary.stats.pages_aborted,
            summary.stats.pages_denied
        );
        Ok(summary)
    }

    /// Submits a page's links to admission and queues the admitted ones
    fn enqueue_links(&mut self, body: &str, base_url: &Url) {
        for link in extract_links(body, base_url) {
            if self.visited.contains(link.as_str()) {
                continue;
            }
            self.visited.insert(link.as_str().to_string());

            match self.admission.admit(&link) {
                Admission::Allow => self.frontier.push_back(link),
                Admission::Deny(reason) => {
                    tracing::debug!("Page crawl disallowed: {}, reason: {}", link, reason);
                    self.stats.pages_denied += 1;
                }
            }
        }
    }

    /// Enforces the minimum spacing between page requests to the site
    async fn pace(&self) {
        if let Some(last) = self.last_fetch {
            let delay = Duration::from_millis(self.config.request_delay_ms);
            let since = last.elapsed();
            if since < delay {
                tokio::time::sleep(delay - since).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_output_root() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("archive");
        let config = ArchiveConfig::new(
            Url::parse("https://example.com/").unwrap(),
            out.clone(),
        );

        let coordinator = Coordinator::new(config);
        assert!(coordinator.is_ok());
        assert!(out.is_dir());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ArchiveConfig::new(
            Url::parse("ftp://example.com/").unwrap(),
            PathBuf::from("./out"),
        );
        assert!(Coordinator::new(config).is_err());
    }
}
