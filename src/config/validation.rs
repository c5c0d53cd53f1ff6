//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the origin and CDN base URLs are present and well formed
//! - Validate value ranges (cache TTL > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: MirrorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::MirrorConfig;

/// A single semantic configuration error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("origin.base_url is required")]
    MissingOrigin,

    #[error("origin.base_url is not a valid http(s) URL: {0}")]
    InvalidOrigin(String),

    #[error("origin.cdn_url is not a valid http(s) URL: {0}")]
    InvalidCdn(String),

    #[error("origin.cache_ttl_secs must be greater than zero")]
    ZeroCacheTtl,
}

/// Validate a loaded configuration, collecting every error found.
pub fn validate_config(config: &MirrorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.origin.base_url.is_empty() {
        errors.push(ValidationError::MissingOrigin);
    } else if !is_http_url(&config.origin.base_url) {
        errors.push(ValidationError::InvalidOrigin(
            config.origin.base_url.clone(),
        ));
    }

    if let Some(cdn) = &config.origin.cdn_url {
        if !is_http_url(cdn) {
            errors.push(ValidationError::InvalidCdn(cdn.clone()));
        }
    }

    if config.origin.cache_ttl_secs == 0 {
        errors.push(ValidationError::ZeroCacheTtl);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::MirrorConfig;

    fn config_with_origin(origin: &str) -> MirrorConfig {
        let mut config = MirrorConfig::default();
        config.origin.base_url = origin.to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = config_with_origin("https://cms.example.com");
        config.origin.cdn_url = Some("https://cdn.example.com".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_origin_fails() {
        let errors = validate_config(&MirrorConfig::default()).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MissingOrigin));
    }

    #[test]
    fn test_malformed_origin_fails() {
        let errors = validate_config(&config_with_origin("not a url")).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidOrigin(_)));
    }

    #[test]
    fn test_non_http_scheme_fails() {
        let errors = validate_config(&config_with_origin("ftp://cms.example.com")).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidOrigin(_)));
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = config_with_origin("not a url");
        config.origin.cdn_url = Some("also not a url".to_string());
        config.origin.cache_ttl_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
