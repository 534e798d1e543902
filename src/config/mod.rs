//! Configuration module for Shiori-Archive
//!
//! The archive configuration is assembled from command-line arguments; the
//! site profile (id pattern, metadata tolerance) can additionally be loaded
//! from a TOML file so site-specific choices stay swappable.

mod parser;
mod types;
mod validation;

pub use parser::load_site_profile;
pub use types::{ArchiveConfig, IdPattern, MissingMetaPolicy, SiteProfile};
pub use validation::validate;
