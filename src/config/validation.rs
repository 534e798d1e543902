use crate::config::types::ArchiveConfig;
use crate::ConfigError;
use url::Url;

/// Validates the archive configuration
///
/// Checked before any network or filesystem work: a bad root URL or output
/// path aborts the whole run (nothing is partially archived at that level).
pub fn validate(config: &ArchiveConfig) -> Result<(), ConfigError> {
    validate_root_url(&config.root_url)?;

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::Validation(format!("Invalid proxy URI '{}': {}", proxy, e)))?;
    }

    if config.request_delay_ms == 0 {
        return Err(ConfigError::Validation(
            "request-delay-ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the root URL: http(s) with a non-empty authority
fn validate_root_url(url: &Url) -> Result<(), ConfigError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root URL '{}' has no host",
            url
        )));
    }

    Ok(())
}
