use std::process::ExitCode;

use caching_proxy::cache::CacheStore;
use caching_proxy::cli::{render_clear_report, Cli};
use caching_proxy::config::validation::validate_config;
use caching_proxy::lifecycle::startup;
use caching_proxy::observability::logging::init_logging;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if cli.clear_cache {
        let store = CacheStore::new(&config.cache.root_dir);
        return match store.clear_all().await {
            Ok(report) => {
                println!("{}", render_clear_report(&report));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error clearing cache: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if !config.is_runnable() {
        if let Err(e) = Cli::print_usage() {
            eprintln!("Failed to print usage: {e}");
        }
        return ExitCode::SUCCESS;
    }

    if let Err(errors) = validate_config(&config) {
        for error in errors {
            eprintln!("Invalid configuration: {error}");
        }
        return ExitCode::FAILURE;
    }

    tracing::info!(
        port = config.listener.port,
        origin = %config.origin.base_url,
        cache_root = %config.cache.root_dir.display(),
        "caching-proxy v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Proxy failed");
            eprintln!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
