use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Main configuration for an archive run
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Root URL of the target site; crawling never leaves its authority
    pub root_url: Url,

    /// Directory the article tree is written under
    pub output_dir: PathBuf,

    /// Optional proxy URI, used for image downloads only
    pub proxy: Option<String>,

    /// Minimum time between page requests to the site (milliseconds)
    pub request_delay_ms: u64,

    /// Fixed pause before each image download (milliseconds)
    pub image_delay_ms: u64,

    /// Site-specific extraction choices
    pub profile: SiteProfile,
}

/// Site-specific choices that are known to vary between deployments of the
/// target site. Loadable from TOML via `load_site_profile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteProfile {
    /// How article ids are derived from page URLs
    #[serde(rename = "id-pattern", default)]
    pub id_pattern: IdPattern,

    /// What to do when the publish date or category element is missing
    #[serde(rename = "missing-meta", default)]
    pub missing_meta: MissingMetaPolicy,
}

/// Named article-id derivation patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum IdPattern {
    /// Numeric segment following the `/wp/` path marker
    #[default]
    #[serde(rename = "wp-path")]
    WpPath,

    /// Numeric segment immediately preceding a `.html` suffix
    #[serde(rename = "html-suffix")]
    HtmlSuffix,
}

/// Tolerance for a missing publish-date or category element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MissingMetaPolicy {
    /// Skip the page; no incomplete records are emitted
    #[default]
    #[serde(rename = "skip")]
    Skip,

    /// Persist the record with the missing field left empty
    #[serde(rename = "allow-empty")]
    AllowEmpty,
}

impl ArchiveConfig {
    /// Creates a configuration with the default pacing and site profile
    pub fn new(root_url: Url, output_dir: PathBuf) -> Self {
        Self {
            root_url,
            output_dir,
            proxy: None,
            request_delay_ms: 1000,
            image_delay_ms: 1000,
            profile: SiteProfile::default(),
        }
    }
}
