//! Per-page orchestration: extract, download images, persist, all or nothing

use crate::archive::{
    ArticleExtractor, ArticlePersister, ClaimRegistry, CompletionIndex, ExtractOutcome,
    ImageDownloader, PersistOutcome, SkipReason,
};
use crate::site::{ArticleId, ArticleIdExtractor};
use crate::Result;
use url::Url;

/// A page the crawl engine fetched successfully
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

/// Outcome of processing one fetched page
///
/// Every page produces a value the orchestrator can count; nothing about a
/// page's fate is fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// No article id could be derived; not an article page
    NotArticle,

    /// Another worker holds the claim for this article id
    Busy,

    /// Extraction declined the page; nothing was persisted
    Skipped(SkipReason),

    /// An image failed hard; downloaded bytes are kept, no marker written
    Aborted { article_id: ArticleId },

    /// The article is fully archived and its marker exists
    Persisted {
        article_id: ArticleId,
        images: usize,
        downloaded: usize,
        reused: usize,
    },
}

/// Sequences the pipeline for one page
///
/// Within a page everything is sequential: extraction, then images one at a
/// time, then persistence. The persister is only reached when the image pass
/// did not abort, which is what makes the completion marker an
/// all-or-nothing signal.
pub struct PageProcessor {
    ids: ArticleIdExtractor,
    extractor: ArticleExtractor,
    images: ImageDownloader,
    persister: ArticlePersister,
    completion: CompletionIndex,
    claims: ClaimRegistry,
}

impl PageProcessor {
    pub fn new(
        ids: ArticleIdExtractor,
        extractor: ArticleExtractor,
        images: ImageDownloader,
        persister: ArticlePersister,
        completion: CompletionIndex,
        claims: ClaimRegistry,
    ) -> Self {
        Self {
            ids,
            extractor,
            images,
            persister,
            completion,
            claims,
        }
    }

    /// Processes one fetched page to a terminal outcome
    ///
    /// `Err` is reserved for persistence-level I/O failures (the article
    /// directory or marker could not be written); everything the page itself
    /// can do wrong comes back as an `Ok` outcome.
    pub async fn process(&self, page: &FetchedPage) -> Result<PageOutcome> {
        let Some(article_id) = self.ids.extract(&page.url) else {
            tracing::debug!("No article id in {}, skipping", page.url);
            return Ok(PageOutcome::NotArticle);
        };

        // Claim before any extraction work: two URLs can resolve to the
        // same article id.
        let Some(_claim) = self.claims.claim(article_id) else {
            tracing::debug!(
                "Article {} is already in flight, leaving {} for a later run",
                article_id,
                page.url
            );
            return Ok(PageOutcome::Busy);
        };

        let fields = match self.extractor.extract(&page.body, article_id, &self.completion) {
            ExtractOutcome::Extracted(fields) => fields,
            ExtractOutcome::Skipped(reason) => {
                tracing::info!("Skipping {}: {}", page.url, reason);
                return Ok(PageOutcome::Skipped(reason));
            }
        };

        let article_dir = self.completion.article_dir(article_id);
        std::fs::create_dir_all(&article_dir)?;

        let image_pass = self
            .images
            .process(&fields.image_sources, &page.url, &article_dir)
            .await;

        if image_pass.aborted {
            tracing::warn!(
                "Image failures on {}, article {} left incomplete for retry",
                page.url,
                article_id
            );
            return Ok(PageOutcome::Aborted { article_id });
        }

        let images = image_pass.images.len();
        let outcome = self.persister.persist(
            article_id,
            &fields,
            image_pass.images,
            image_pass.cover,
            page.url.as_str(),
        )?;

        match outcome {
            PersistOutcome::Persisted => {
                tracing::info!("Archived article {} from {}", article_id, page.url);
                Ok(PageOutcome::Persisted {
                    article_id,
                    images,
                    downloaded: image_pass.downloaded,
                    reused: image_pass.reused,
                })
            }
            PersistOutcome::AlreadyExists => {
                tracing::info!("Article {} appeared concurrently, skipping", article_id);
                Ok(PageOutcome::Skipped(SkipReason::AlreadyArchived))
            }
        }
    }
}
