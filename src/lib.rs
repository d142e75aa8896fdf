pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

// Re-export for convenience
pub use crate::cli::ui;
pub use crate::core::config;

use crate::core::format::DisplayFormatter;
use crate::core::{RateCache, RateProvider};
use crate::providers::{ExchangeRateApi, RetryingFetcher};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rate { from: String, to: String },
    Show,
    Overview,
    Watch,
}

/// Wires the cache, fetcher and provider described by `config`.
pub fn build_provider(config: &config::AppConfig) -> Result<RateProvider> {
    let store = store::open_store(config);
    let source = ExchangeRateApi::new(&config.provider.base_url, &config.provider.version)?;
    let fetcher = RetryingFetcher::new(Arc::new(source), config.fetch.retry_policy());
    Ok(RateProvider::new(
        RateCache::new(store),
        Arc::new(fetcher),
        config.fetch.freshness_window(),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratewatch starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = Arc::new(build_provider(&config)?);
    let formatter = Arc::new(DisplayFormatter::new(&config.display));

    match command {
        AppCommand::Rate { from, to } => {
            let pair = config::CurrencyPair::new(&from, &to);
            cli::rate::run(&provider, &formatter, &pair.from, &pair.to).await
        }
        AppCommand::Show => cli::show::run(&provider, &config.pairs, &formatter).await,
        AppCommand::Overview => cli::overview::run(provider.cache(), &formatter).await,
        AppCommand::Watch => {
            let period = config.refresh_interval();
            cli::watch::run(provider, config.pairs.clone(), formatter, period).await
        }
    }
}
