use crate::config::types::SiteProfile;
use crate::ConfigError;
use std::path::Path;

/// Loads a site profile from a TOML file
///
/// The profile names the article-id pattern and the missing-metadata policy
/// for the target site. Fields that are absent fall back to the defaults
/// (`wp-path`, `skip`).
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shiori_archive::config::load_site_profile;
///
/// let profile = load_site_profile(Path::new("site.toml")).unwrap();
/// ```
pub fn load_site_profile(path: &Path) -> Result<SiteProfile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let profile: SiteProfile = toml::from_str(&content)?;
    Ok(profile)
}
