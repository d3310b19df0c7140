//! Shared types for the DAYBRIEF pipeline.
//!
//! Every record here is a transient snapshot of one upstream source,
//! produced during a single run and discarded after the digest is
//! composed. Nothing carries identity across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spot prices
// ---------------------------------------------------------------------------

/// One asset's spot price in USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPrice {
    pub name: String,
    pub price: f64,
}

/// Spot prices for every tracked asset, as returned by the
/// market-price index in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    pub assets: Vec<AssetPrice>,
}

impl PriceRecord {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extended market stats
// ---------------------------------------------------------------------------

/// Per-asset summary from the extended market-data index.
///
/// The optional fields come from upstream as-is; an absent 24h change
/// renders as a down arrow, absent cap/volume as "N/A".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetStats {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
}

/// Extended market snapshot: per-asset stats plus BTC dominance,
/// computed from two upstream calls (asset quotes + global metrics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketStatsRecord {
    pub entries: Vec<AssetStats>,
    /// BTC market cap as a percentage of total market cap.
    pub btc_dominance: f64,
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Current conditions for one configured city.
///
/// Sunrise/sunset are pre-formatted 12-hour clock strings; the epoch
/// arithmetic happens in the weather adapter so the composer only
/// substitutes text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    pub sunrise: String,
    pub sunset: String,
}

// ---------------------------------------------------------------------------
// Exchange rates
// ---------------------------------------------------------------------------

/// One currency pair, e.g. "USD→MDL".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatePair {
    pub label: String,
    pub rate: f64,
}

impl fmt::Display for RatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}", self.label, self.rate)
    }
}

/// Fetched and derived exchange rates for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRecord {
    pub pairs: Vec<RatePair>,
}

// ---------------------------------------------------------------------------
// Trending asset
// ---------------------------------------------------------------------------

/// The top trending asset of the day.
///
/// `price_btc` is quoted in BTC rather than USD, hence the much
/// smaller magnitude and the 15-decimal rendering in the composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingRecord {
    pub name: String,
    pub symbol: String,
    pub icon_url: String,
    pub price_btc: f64,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything gathered in one run. Each slot is `None` when that
/// source failed; the composer requires all of them to be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub prices: Option<PriceRecord>,
    pub stats: Option<MarketStatsRecord>,
    pub trending: Option<TrendingRecord>,
    pub rates: Option<FxRecord>,
    pub weather: Option<Vec<WeatherRecord>>,
}

impl Snapshot {
    /// Whether every source produced a record this run.
    pub fn is_complete(&self) -> bool {
        self.prices.is_some()
            && self.stats.is_some()
            && self.trending.is_some()
            && self.rates.is_some()
            && self.weather.is_some()
    }

    /// Names of the sources that came back absent (for logging).
    pub fn missing_sources(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.prices.is_none() {
            missing.push("prices");
        }
        if self.stats.is_none() {
            missing.push("markets");
        }
        if self.trending.is_none() {
            missing.push("trending");
        }
        if self.rates.is_none() {
            missing.push("fx");
        }
        if self.weather.is_none() {
            missing.push("weather");
        }
        missing
    }
}

// ---------------------------------------------------------------------------
// Digest & run outcome
// ---------------------------------------------------------------------------

/// The composed text of one run. No identity, no versioning — each
/// run's digest is independent of prior runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub text: String,
    pub composed_at: DateTime<Utc>,
}

impl Digest {
    pub fn new(text: String) -> Self {
        Self {
            text,
            composed_at: Utc::now(),
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Terminal state of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Digest composed and sent.
    Delivered,
    /// One or more sources absent — no digest produced.
    Skipped,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Delivered => write!(f, "delivered"),
            RunOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
