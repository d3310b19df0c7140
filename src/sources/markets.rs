//! Extended market-data adapter.
//!
//! Fetches per-asset quotes (price, 24h change, market cap, volume)
//! and global market metrics from CoinMarketCap, then computes BTC
//! dominance from the two responses — the only cross-call
//! computation in the system.
//!
//! API: `https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest`
//!      `https://pro-api.coinmarketcap.com/v1/global-metrics/quotes/latest`
//! Auth: API key via `X-CMC_PRO_API_KEY` header. Free tier available.
//! Rate limit: 30 req/min on the free tier — two calls per run.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::types::{AssetStats, MarketStatsRecord};

const BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";
const KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    name: String,
    symbol: String,
    quote: HashMap<String, UsdQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    percent_change_24h: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    volume_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GlobalMetricsResponse {
    data: GlobalMetricsData,
}

#[derive(Debug, Deserialize)]
struct GlobalMetricsData {
    quote: HashMap<String, GlobalUsdQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalUsdQuote {
    #[serde(default)]
    total_market_cap: Option<f64>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct MarketStatsSource {
    http: Client,
    api_key: Option<String>,
    symbols: Vec<String>,
}

impl MarketStatsSource {
    /// `api_key` is resolved by the caller; without one every fetch
    /// fails immediately and the run proceeds without this source.
    pub fn new(api_key: Option<String>, symbols: Vec<String>) -> Result<Self> {
        Ok(Self {
            http: super::http_client("markets")?,
            api_key,
            symbols,
        })
    }

    /// Fetch asset quotes and global metrics, combine into one record.
    pub async fn fetch(&self) -> Result<MarketStatsRecord> {
        let api_key = self
            .api_key
            .as_deref()
            .context("No CoinMarketCap API key configured")?;

        let quotes = self.fetch_quotes(api_key).await?;
        let total_cap = self.fetch_total_market_cap(api_key).await?;

        Self::to_record(&self.symbols, &quotes, total_cap)
    }

    async fn fetch_quotes(&self, api_key: &str) -> Result<HashMap<String, QuoteEntry>> {
        let url = format!(
            "{BASE_URL}/cryptocurrency/quotes/latest?symbol={}&convert=USD",
            self.symbols.join(",")
        );

        debug!(url = %url, "Fetching asset quotes");

        let resp = self
            .http
            .get(&url)
            .header(KEY_HEADER, api_key)
            .send()
            .await
            .context("CoinMarketCap quotes request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("CoinMarketCap quotes API error: {status}");
        }

        let body: QuotesResponse = resp
            .json()
            .await
            .context("Failed to parse CoinMarketCap quotes response")?;

        Ok(body.data)
    }

    async fn fetch_total_market_cap(&self, api_key: &str) -> Result<f64> {
        let url = format!("{BASE_URL}/global-metrics/quotes/latest?convert=USD");

        let resp = self
            .http
            .get(&url)
            .header(KEY_HEADER, api_key)
            .send()
            .await
            .context("CoinMarketCap global-metrics request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("CoinMarketCap global-metrics API error: {status}");
        }

        let body: GlobalMetricsResponse = resp
            .json()
            .await
            .context("Failed to parse CoinMarketCap global-metrics response")?;

        body.data
            .quote
            .get("USD")
            .and_then(|q| q.total_market_cap)
            .context("No USD total market cap in global-metrics response")
    }

    /// Combine quotes and global metrics. Every configured symbol
    /// must have a USD price; change/cap/volume stay optional and
    /// degrade at render time.
    fn to_record(
        symbols: &[String],
        quotes: &HashMap<String, QuoteEntry>,
        total_market_cap: f64,
    ) -> Result<MarketStatsRecord> {
        let mut entries = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let entry = quotes
                .get(symbol)
                .with_context(|| format!("No quote for '{symbol}' in response"))?;
            let usd = entry
                .quote
                .get("USD")
                .with_context(|| format!("No USD quote for '{symbol}'"))?;
            let price = usd
                .price
                .with_context(|| format!("No USD price for '{symbol}'"))?;

            entries.push(AssetStats {
                name: entry.name.clone(),
                symbol: entry.symbol.clone(),
                price,
                change_24h: usd.percent_change_24h,
                market_cap: usd.market_cap,
                volume_24h: usd.volume_24h,
            });
        }

        let btc_cap = entries
            .iter()
            .find(|e| e.symbol == "BTC")
            .and_then(|e| e.market_cap)
            .context("No BTC market cap in quotes — cannot compute dominance")?;

        Ok(MarketStatsRecord {
            entries,
            btc_dominance: dominance(btc_cap, total_market_cap),
        })
    }
}

/// Share of `part` in `whole`, as a percentage. A non-positive whole
/// yields 0.0 rather than dividing by zero.
pub fn dominance(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
