//! Command-line interface.

use clap::{CommandFactory, Parser};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::cache::ClearReport;
use crate::config::loader::{load_config, ConfigError};
use crate::config::ProxyConfig;

const EXAMPLES: &str = "\
Examples:
  Start the proxy on port 8080, forwarding to http://example.com:
    caching-proxy --port 8080 --origin http://example.com

  Clear the cache:
    caching-proxy --clear-cache

Notes:
  --port and --origin are required to start the server.
  --clear-cache is a standalone operation and needs neither.";

#[derive(Debug, Parser)]
#[command(name = "caching-proxy", version)]
#[command(about = "Caching proxy server: serves GET requests from a local disk cache, forwarding misses to an origin")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Port for the proxy server to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Origin server URL to proxy requests to.
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Clear the cached files and exit.
    #[arg(long)]
    pub clear_cache: bool,

    /// Directory holding cached responses [default: Cache-X].
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Address to bind [default: 0.0.0.0].
    #[arg(long)]
    pub host: Option<String>,

    /// TOML configuration file; flags given here override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file (if any), then flags.
    pub fn resolve_config(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(origin) = &self.origin {
            config.origin.base_url = origin.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache.root_dir = dir.clone();
        }
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
    }

    /// Print usage to stdout.
    pub fn print_usage() -> std::io::Result<()> {
        Self::command().print_help()
    }
}

/// Human-readable summary of a cache clear.
pub fn render_clear_report(report: &ClearReport) -> String {
    if !report.root_existed {
        return format!("Cache directory '{}' does not exist.", report.root.display());
    }

    let mut out = String::new();
    for path in &report.removed {
        let _ = writeln!(out, "Deleted file {}", path.display());
    }
    for path in &report.failed {
        let _ = writeln!(out, "Error deleting file {}", path.display());
    }
    out.push_str("Cache cleared successfully.");
    out
}
