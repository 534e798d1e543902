//! Run accounting: per-outcome counters and the completion summary

use crate::archive::PageOutcome;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Counters over everything the run did
///
/// Every per-page outcome is recorded here by the coordinator, so no page's
/// fate is lost to a detached callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched as HTML
    pub pages_fetched: u64,

    /// Unique discovered URLs the admission policy pruned
    pub pages_denied: u64,

    /// Page fetches that failed (HTTP error or transport)
    pub fetch_failures: u64,

    /// Fetched pages with no derivable article id
    pub non_articles: u64,

    /// Articles fully archived this run
    pub articles_persisted: u64,

    /// Pages skipped by extraction (including already-archived re-checks)
    pub pages_skipped: u64,

    /// Pages left incomplete because an image failed hard
    pub pages_aborted: u64,

    /// Pages that failed at the persistence layer
    pub page_failures: u64,

    /// Images fetched over the network
    pub images_downloaded: u64,

    /// Images found on disk from earlier partial runs
    pub images_reused: u64,
}

impl CrawlStats {
    /// Records one page-processing outcome
    pub fn record_outcome(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::NotArticle => self.non_articles += 1,
            PageOutcome::Busy | PageOutcome::Skipped(_) => self.pages_skipped += 1,
            PageOutcome::Aborted { .. } => self.pages_aborted += 1,
            PageOutcome::Persisted {
                downloaded, reused, ..
            } => {
                self.articles_persisted += 1;
                self.images_downloaded += *downloaded as u64;
                self.images_reused += *reused as u64;
            }
        }
    }
}

/// Completion metrics of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub root_url: Url,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub stats: CrawlStats,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Crawling for {} completed, time elapsed: {:.2?}",
            self.root_url, self.elapsed
        )
    }
}
