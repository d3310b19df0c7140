//! Trending-asset adapter.
//!
//! Fetches the top trending coin from CoinGecko, then looks up its
//! market cap and total volume with a second detail call. The detail
//! call is best-effort: if it fails or the fields are absent, the
//! record keeps `None` there and the composer renders "N/A" — unlike
//! every other source, this never fails the record.
//!
//! API: `https://api.coingecko.com/api/v3/search/trending`
//!      `https://api.coingecko.com/api/v3/coins/{id}`
//! Auth: None required (public endpoints).

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::TrendingRecord;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    coins: Vec<TrendingCoin>,
}

#[derive(Debug, Deserialize)]
struct TrendingCoin {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    id: String,
    name: String,
    symbol: String,
    /// Small icon URL.
    #[serde(default)]
    small: String,
    price_btc: f64,
}

#[derive(Debug, Deserialize)]
struct CoinDetailResponse {
    #[serde(default)]
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize, Default)]
struct CoinMarketData {
    #[serde(default)]
    market_cap: CurrencyMap,
    #[serde(default)]
    total_volume: CurrencyMap,
}

#[derive(Debug, Deserialize, Default)]
struct CurrencyMap {
    #[serde(default)]
    usd: Option<f64>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct TrendingSource {
    http: Client,
}

impl TrendingSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: super::http_client("trending")?,
        })
    }

    /// Fetch the coin of the day.
    pub async fn fetch(&self) -> Result<TrendingRecord> {
        let url = format!("{BASE_URL}/search/trending");

        debug!(url = %url, "Fetching trending coins");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("CoinGecko trending request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("CoinGecko trending API error: {status}");
        }

        let body: TrendingResponse = resp
            .json()
            .await
            .context("Failed to parse CoinGecko trending response")?;

        let top = body
            .coins
            .into_iter()
            .next()
            .context("Trending list came back empty")?
            .item;

        let (market_cap, total_volume) = match self.fetch_detail(&top.id).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(coin = %top.id, error = %e, "Detail lookup failed, degrading to N/A");
                (None, None)
            }
        };

        Ok(TrendingRecord {
            name: top.name,
            symbol: top.symbol,
            icon_url: top.small,
            price_btc: top.price_btc,
            market_cap,
            total_volume,
        })
    }

    /// Detail lookup by id: market cap and total volume in USD.
    async fn fetch_detail(&self, id: &str) -> Result<(Option<f64>, Option<f64>)> {
        let url = format!(
            "{BASE_URL}/coins/{id}?localization=false&tickers=false&community_data=false&developer_data=false"
        );

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("CoinGecko coin-detail request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("CoinGecko coin-detail API error: {status}");
        }

        let body: CoinDetailResponse = resp
            .json()
            .await
            .context("Failed to parse CoinGecko coin-detail response")?;

        Ok(Self::extract_detail(&body))
    }

    fn extract_detail(body: &CoinDetailResponse) -> (Option<f64>, Option<f64>) {
        match &body.market_data {
            Some(md) => (md.market_cap.usd, md.total_volume.usd),
            None => (None, None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_response_parses_top_item() {
        let json = r#"{
            "coins": [
                {"item": {"id": "pepe", "name": "Pepe", "symbol": "PEPE",
                          "small": "https://example.com/pepe.png",
                          "price_btc": 0.000000000172345678901234}},
                {"item": {"id": "bonk", "name": "Bonk", "symbol": "BONK",
                          "small": "", "price_btc": 0.0000000003}}
            ]
        }"#;
        let body: TrendingResponse = serde_json::from_str(json).unwrap();
        let top = &body.coins[0].item;
        assert_eq!(top.id, "pepe");
        assert_eq!(top.symbol, "PEPE");
        assert!(top.price_btc > 0.0);
    }

    #[test]
    fn test_trending_response_missing_coins_fails() {
        let body = serde_json::from_str::<TrendingResponse>(r#"{"count": 7}"#);
        assert!(body.is_err());
    }

    #[test]
    fn test_extract_detail_full() {
        let body: CoinDetailResponse = serde_json::from_str(
            r#"{"market_data": {"market_cap": {"usd": 2900000000.0},
                "total_volume": {"usd": 710000000.0}}}"#,
        )
        .unwrap();
        let (cap, vol) = TrendingSource::extract_detail(&body);
        assert_eq!(cap, Some(2_900_000_000.0));
        assert_eq!(vol, Some(710_000_000.0));
    }

    #[test]
    fn test_extract_detail_missing_market_data() {
        let body: CoinDetailResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(TrendingSource::extract_detail(&body), (None, None));
    }

    #[test]
    fn test_extract_detail_missing_usd_entries() {
        let body: CoinDetailResponse = serde_json::from_str(
            r#"{"market_data": {"market_cap": {}, "total_volume": {}}}"#,
        )
        .unwrap();
        assert_eq!(TrendingSource::extract_detail(&body), (None, None));
    }

    #[test]
    fn test_source_construction() {
        assert!(TrendingSource::new().is_ok());
    }
}
