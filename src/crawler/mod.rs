//! The crawl engine driving the archive pipeline
//!
//! A deliberately small single-site engine: a frontier seeded with the root
//! URL, admission checks at link-discovery time, a per-domain politeness
//! delay between page fetches, and one call into the page processor per
//! successfully fetched page.

mod coordinator;
mod fetcher;
mod links;
mod stats;

pub use coordinator::Coordinator;
pub use fetcher::{build_image_client, build_page_client, fetch_page, FetchResult};
pub use links::extract_links;
pub use stats::{CrawlStats, CrawlSummary};

use crate::config::ArchiveConfig;
use crate::Result;

/// Runs a complete archive crawl
///
/// Validates the configuration, creates the output root, and walks the site
/// until the frontier is exhausted. Setup failures (bad root URL, output
/// directory not creatable, client construction) are the only errors that
/// abort the run; per-page failures are logged, counted, and survived.
pub async fn crawl(config: ArchiveConfig) -> Result<CrawlSummary> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
