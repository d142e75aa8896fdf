use crate::core::fetch::RetryPolicy;
use crate::core::rate::normalize_code;
use crate::providers::exchangerate_api::{DEFAULT_BASE_URL, DEFAULT_VERSION};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Upper bound for the freshness window and refresh interval: 365 days.
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: normalize_code(from),
            to: normalize_code(to),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub version: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

/// Freshness and retry options for rate lookups.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FetchOptions {
    pub freshness_window_minutes: u64,
    pub max_attempts: u32,
    pub rate_limit_delay_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            freshness_window_minutes: 60,
            max_attempts: 3,
            rate_limit_delay_ms: 1000,
        }
    }
}

impl FetchOptions {
    pub fn freshness_window(&self) -> chrono::Duration {
        let minutes = i64::try_from(self.freshness_window_minutes).unwrap_or(i64::MAX);
        chrono::Duration::try_minutes(minutes).unwrap_or(chrono::Duration::MAX)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            rate_limit_delay: std::time::Duration::from_millis(self.rate_limit_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    #[default]
    Symbol,
    Code,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub display_type: DisplayType,
    pub position: SymbolPosition,
    /// Extra or overriding currency symbols, merged over the built-in table.
    pub symbols: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pairs: Vec<CurrencyPair>,
    pub provider: ProviderConfig,
    pub fetch: FetchOptions,
    pub display: DisplayConfig,
    /// Defaults to the freshness window.
    pub refresh_interval_minutes: Option<u64>,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "ratewatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "ratewatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.normalize();
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        let minutes = self
            .refresh_interval_minutes
            .unwrap_or(self.fetch.freshness_window_minutes);
        std::time::Duration::from_secs(minutes.saturating_mul(60))
    }

    fn normalize(&mut self) {
        for pair in &mut self.pairs {
            *pair = CurrencyPair::new(&pair.from, &pair.to);
        }
        self.display.symbols = std::mem::take(&mut self.display.symbols)
            .into_iter()
            .map(|(code, symbol)| (normalize_code(&code), symbol))
            .collect();
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.max_attempts == 0 {
            bail!("fetch.max_attempts must be at least 1");
        }
        if self.fetch.freshness_window_minutes == 0 {
            bail!("fetch.freshness_window_minutes must be at least 1");
        }
        if self.fetch.freshness_window_minutes > MAX_INTERVAL_MINUTES {
            bail!(
                "fetch.freshness_window_minutes must be at most {}",
                MAX_INTERVAL_MINUTES
            );
        }
        match self.refresh_interval_minutes {
            Some(0) => bail!("refresh_interval_minutes must be at least 1"),
            Some(minutes) if minutes > MAX_INTERVAL_MINUTES => {
                bail!("refresh_interval_minutes must be at most {}", MAX_INTERVAL_MINUTES)
            }
            _ => {}
        }
        if let Some(pair) = self
            .pairs
            .iter()
            .find(|p| p.from.is_empty() || p.to.is_empty())
        {
            bail!("Currency pair has an empty code: {:?}", pair);
        }
        Ok(())
    }
}
