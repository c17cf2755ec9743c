//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, backlog > 0)
//! - Check the origin URL is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs after CLI overrides are merged, before the server starts

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("origin.base_url '{url}' is not a valid URL: {reason}")]
    InvalidOriginUrl { url: String, reason: String },

    #[error("origin.base_url scheme must be http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("cache.root_dir must not be empty")]
    EmptyCacheRoot,

    #[error("listener.host must not be empty")]
    EmptyHost,
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.origin.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidOriginUrl {
            url: config.origin.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::Zero("listener.backlog"));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }
    if config.origin.timeout_secs == 0 {
        errors.push(ValidationError::Zero("origin.timeout_secs"));
    }
    if config.timeouts.client_read_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.client_read_secs"));
    }
    if config.cache.root_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyCacheRoot);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
