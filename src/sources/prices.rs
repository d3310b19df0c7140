//! Market-price index adapter.
//!
//! Fetches spot USD prices for the configured asset list from the
//! CoinGecko simple-price endpoint in a single GET.
//!
//! API: `https://api.coingecko.com/api/v3/simple/price`
//! Auth: None required (public endpoint).
//! Rate limit: 10–30 req/min on the free tier — one call per run.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::TrackedAsset;
use crate::types::{AssetPrice, PriceRecord};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// One entry of the simple-price map: `{"bitcoin": {"usd": 67123.45}}`.
#[derive(Debug, Deserialize)]
struct SimplePrice {
    #[serde(default)]
    usd: Option<f64>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct PriceSource {
    http: Client,
    tracked: Vec<TrackedAsset>,
}

impl PriceSource {
    pub fn new(tracked: Vec<TrackedAsset>) -> Result<Self> {
        Ok(Self {
            http: super::http_client("prices")?,
            tracked,
        })
    }

    /// Fetch spot prices for all tracked assets.
    pub async fn fetch(&self) -> Result<PriceRecord> {
        let ids: Vec<&str> = self.tracked.iter().map(|a| a.id.as_str()).collect();
        let url = format!(
            "{BASE_URL}/simple/price?ids={}&vs_currencies=usd",
            ids.join(",")
        );

        debug!(url = %url, "Fetching spot prices");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("CoinGecko simple-price request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("CoinGecko simple-price API error: {status}");
        }

        let body: HashMap<String, SimplePrice> = resp
            .json()
            .await
            .context("Failed to parse CoinGecko simple-price response")?;

        Self::to_record(&self.tracked, &body)
    }

    /// Map the response body onto the tracked-asset list. Every
    /// configured id must be present with a USD quote — a missing
    /// field fails the whole record, there are no partial prices.
    fn to_record(
        tracked: &[TrackedAsset],
        body: &HashMap<String, SimplePrice>,
    ) -> Result<PriceRecord> {
        let mut assets = Vec::with_capacity(tracked.len());
        for asset in tracked {
            let price = body
                .get(&asset.id)
                .and_then(|entry| entry.usd)
                .with_context(|| format!("No USD price for '{}' in response", asset.id))?;
            assets.push(AssetPrice {
                name: asset.name.clone(),
                price,
            });
        }
        Ok(PriceRecord { assets })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
