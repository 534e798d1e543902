//! Shiori-Archive: a polite single-site article archiver
//!
//! This crate crawls one target site, extracts structured article data and
//! embedded images, and persists each article exactly once to a
//! content-addressed directory tree that is safe to re-crawl incrementally.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod site;

use thiserror::Error;

/// Main error type for Shiori-Archive operations
#[derive(Debug, Error)]
pub enum ShioriError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Persistence error: {0}")]
    Persist(#[from] archive::PersistError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read site profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid root URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Shiori-Archive operations
pub type Result<T> = std::result::Result<T, ShioriError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use archive::{ArticleRecord, PageOutcome, PageProcessor};
pub use config::{ArchiveConfig, SiteProfile};
pub use crawler::{crawl, CrawlSummary};
pub use site::{Admission, AdmissionPolicy, ArticleId, ArticleIdExtractor};
