//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys, bot credentials) are referenced by env-var name
//! in the config and resolved once at startup via `std::env::var`,
//! then handed to the adapters at construction time.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub digest: DigestConfig,
    pub assets: AssetsConfig,
    pub fx: FxConfig,
    pub sources: SourcesConfig,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    /// Offset applied to UTC for the greeting and clock rendering.
    pub utc_offset_hours: i64,
    /// Seconds between runs. Absent → single-shot.
    #[serde(default)]
    pub loop_interval_secs: Option<u64>,
    /// Cities queried by the weather adapter, in render order.
    pub cities: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Market-price index ids with their display names.
    pub tracked: Vec<TrackedAsset>,
    /// Ticker symbols queried on the extended market-data index.
    pub stat_symbols: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackedAsset {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FxConfig {
    /// Quote currencies pulled from the USD rate table.
    pub quote_currencies: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub openweather_key_env: Option<String>,
    pub cmc_key_env: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    pub telegram_bot_token_env: Option<String>,
    pub telegram_chat_id_env: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an env-var name from the config to its value, if both
    /// the name and the variable are present.
    pub fn resolve_env(env_name: Option<&str>) -> Option<String> {
        env_name.and_then(|name| std::env::var(name).ok())
    }
}
