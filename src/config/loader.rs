//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
///
/// Missing sections and fields fall back to their defaults. Semantic checks
/// are left to [`crate::config::validation::validate_config`] so that CLI
/// overrides can be applied first.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DispatchMode, LogFormat};
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [listener]
            port = 8080

            [origin]
            base_url = "http://example.test"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.listener.backlog, 5);
        assert_eq!(config.origin.base_url, "http://example.test");
        assert_eq!(config.origin.timeout_secs, 30);
        assert_eq!(config.cache.root_dir.to_str(), Some("Cache-X"));
    }

    #[test]
    fn enums_parse_lowercase() {
        let config = parse_config(
            r#"
            [listener]
            dispatch = "sequential"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.dispatch, DispatchMode::Sequential);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = parse_config("[listener\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nroot_dir = \"/tmp/proxy-cache\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cache.root_dir.to_str(), Some("/tmp/proxy-cache"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
