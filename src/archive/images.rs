//! Image download, dedup, and cover selection for one article
//!
//! Images are keyed by their resolved source URL: the local filename is the
//! SHA-256 of that URL plus the URL path's extension. Two distinct URLs that
//! serve identical bytes are stored twice; the same URL always maps to the
//! same file, which is what makes interrupted runs resumable.

use reqwest::{Client, StatusCode};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Insertion-ordered mapping from resolved source URL to local filename
///
/// Serializes as a JSON object whose keys appear in first-seen document
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMap(Vec<(String, String)>);

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.iter().any(|(key, _)| key == url)
    }

    /// Registers a URL → filename pair; the first registration wins
    pub fn insert(&mut self, url: String, file_name: String) {
        if !self.contains(&url) {
            self.0.push((url, file_name));
        }
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == url)
            .map(|(_, file)| file.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(url, file)| (url.as_str(), file.as_str()))
    }
}

impl Serialize for ImageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (url, file) in &self.0 {
            map.serialize_entry(url, file)?;
        }
        map.end()
    }
}

/// Result of the image pass over one article
#[derive(Debug, Clone, Default)]
pub struct ImageOutcome {
    /// Registered images, in first-seen document order
    pub images: ImageMap,

    /// Filename of the first registered image, empty when none registered
    pub cover: String,

    /// At least one image failed hard; the article must not be persisted
    pub aborted: bool,

    /// Images fetched over the network this pass
    pub downloaded: usize,

    /// Images found on disk from a previous partial run
    pub reused: usize,
}

/// Per-fetch failure classification
///
/// Soft failures are expected site noise (dead image links, a flaky proxy
/// exit) and only cost the one image. Anything else makes the article
/// unreliable and aborts its persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImageFailure {
    Soft(String),
    Hard(String),
}

/// Downloads the images referenced by an article's content block
///
/// The client is injected so tests can point it at a mock server and so the
/// optional proxy stays a construction-time concern of the caller.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    proxied: bool,
    delay: Duration,
}

impl ImageDownloader {
    pub fn new(client: Client, proxied: bool, delay: Duration) -> Self {
        Self {
            client,
            proxied,
            delay,
        }
    }

    /// Processes an article's image sources in document order
    ///
    /// Never returns an error: soft failures are logged and skipped, hard
    /// failures set `aborted` but the pass continues so that every
    /// downloadable image still lands on disk for the next run.
    pub async fn process(
        &self,
        sources: &[String],
        page_url: &Url,
        article_dir: &Path,
    ) -> ImageOutcome {
        let mut outcome = ImageOutcome::default();

        for src in sources {
            if src.is_empty() {
                tracing::warn!("Empty image src on {}, skipping", page_url);
                continue;
            }

            let resolved = match resolve_image_url(src, page_url) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::error!("Unresolvable image src '{}' on {}: {}", src, page_url, e);
                    outcome.aborted = true;
                    continue;
                }
            };
            let key = resolved.to_string();
            let file_name = image_file_name(&resolved);
            let target = article_dir.join(&file_name);

            // Resumability: a non-empty file from a previous partial run
            // counts as downloaded and is registered without a fetch.
            if !outcome.images.contains(&key) && file_has_bytes(&target) {
                tracing::info!("Image already on disk for {}: {}", key, file_name);
                outcome.reused += 1;
                register(&mut outcome, key, file_name);
                continue;
            }

            // Duplicate <img> pointing at an already-registered URL
            if outcome.images.contains(&key) {
                tracing::debug!("Duplicate image reference {} on {}", key, page_url);
                continue;
            }

            // Politeness toward the image host, on top of the engine's own
            // page pacing
            tokio::time::sleep(self.delay).await;

            match self.fetch(&resolved).await {
                Ok(bytes) => match std::fs::write(&target, &bytes) {
                    Ok(()) => {
                        tracing::info!(
                            "Image downloaded {} -> {} ({} bytes)",
                            key,
                            file_name,
                            bytes.len()
                        );
                        outcome.downloaded += 1;
                        register(&mut outcome, key, file_name);
                    }
                    Err(e) => {
                        tracing::error!("Failed to write image file {}: {}", target.display(), e);
                        outcome.aborted = true;
                    }
                },
                Err(ImageFailure::Soft(reason)) => {
                    tracing::warn!("Skipping image {} on {}: {}", key, page_url, reason);
                }
                Err(ImageFailure::Hard(reason)) => {
                    tracing::error!("Failed to get image {} on {}: {}", key, page_url, reason);
                    outcome.aborted = true;
                }
            }
        }

        outcome
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, ImageFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ImageFailure::Hard(format!("transport error: {}", e)))?;

        if let Some(failure) = classify_status(response.status(), self.proxied) {
            return Err(failure);
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| ImageFailure::Hard(format!("body read error: {}", e)))
    }
}

/// The first registered image becomes the cover; later ones never do
fn register(outcome: &mut ImageOutcome, key: String, file_name: String) {
    if outcome.cover.is_empty() {
        outcome.cover = file_name.clone();
    }
    outcome.images.insert(key, file_name);
}

/// Classifies a non-success response; `None` means the fetch succeeded
fn classify_status(status: StatusCode, proxied: bool) -> Option<ImageFailure> {
    if status.is_success() {
        return None;
    }
    if status == StatusCode::NOT_FOUND {
        return Some(ImageFailure::Soft("not found".to_string()));
    }
    if status == StatusCode::SERVICE_UNAVAILABLE && proxied {
        return Some(ImageFailure::Soft(
            "service unavailable via proxy".to_string(),
        ));
    }
    Some(ImageFailure::Hard(format!("HTTP {}", status)))
}

/// Resolves an image src against the page URL
///
/// A root-relative src keeps the page's scheme and authority, replaces the
/// path, and drops the query string; anything else must already be an
/// absolute URL.
pub fn resolve_image_url(src: &str, page_url: &Url) -> Result<Url, url::ParseError> {
    if src.starts_with('/') {
        let path = src.split('?').next().unwrap_or(src);
        let path = path.split('#').next().unwrap_or(path);
        let mut resolved = page_url.clone();
        resolved.set_path(path);
        resolved.set_query(None);
        resolved.set_fragment(None);
        Ok(resolved)
    } else {
        Url::parse(src)
    }
}

/// Local filename for an image URL: sha256 hex of the URL plus its extension
pub fn image_file_name(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    let hash = hex::encode(hasher.finalize());
    format!("{}{}", hash, url_extension(url))
}

/// Extension of the URL path, including the dot; empty when there is none
fn url_extension(url: &Url) -> String {
    let file = url.path().rsplit('/').next().unwrap_or("");
    match file.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < file.len() => file[pos..].to_string(),
        _ => String::new(),
    }
}

fn file_has_bytes(path: &Path) -> bool {
    std::fs::metadata(path).map(|meta| meta.len() > 0).unwrap_or(false)
}
