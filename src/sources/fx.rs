//! Foreign-exchange adapter.
//!
//! Fetches the USD-based rate table from the open ER API in one GET
//! and extracts the configured quote currencies. The EUR→MDL cross
//! rate is not fetched — it is derived by composing the two USD rates
//! at aggregation time.
//!
//! API: `https://open.er-api.com/v6/latest/USD`
//! Auth: None required.
//! Rate limit: Generous (free tier, daily refresh upstream).

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::types::{FxRecord, RatePair};

const BASE_URL: &str = "https://open.er-api.com/v6";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RateTableResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct FxSource {
    http: Client,
    quote_currencies: Vec<String>,
}

impl FxSource {
    pub fn new(quote_currencies: Vec<String>) -> Result<Self> {
        Ok(Self {
            http: super::http_client("fx")?,
            quote_currencies,
        })
    }

    /// Fetch the USD rate table and build the labelled pair list.
    pub async fn fetch(&self) -> Result<FxRecord> {
        let url = format!("{BASE_URL}/latest/USD");

        debug!(url = %url, "Fetching USD rate table");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Exchange-rate request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Exchange-rate API error: {status}");
        }

        let body: RateTableResponse = resp
            .json()
            .await
            .context("Failed to parse exchange-rate response")?;

        if body.result != "success" {
            anyhow::bail!("Exchange-rate API returned result '{}'", body.result);
        }

        Self::to_record(&self.quote_currencies, &body.rates)
    }

    /// Extract configured currencies and append the derived EUR→MDL
    /// cross rate when both legs were fetched. Any configured
    /// currency missing from the table fails the record.
    fn to_record(quote_currencies: &[String], rates: &HashMap<String, f64>) -> Result<FxRecord> {
        let mut pairs = Vec::with_capacity(quote_currencies.len() + 1);
        for currency in quote_currencies {
            let rate = rates
                .get(currency)
                .copied()
                .with_context(|| format!("No rate for '{currency}' in USD table"))?;
            pairs.push(RatePair {
                label: format!("USD→{currency}"),
                rate,
            });
        }

        if let (Some(usd_eur), Some(usd_mdl)) = (rates.get("EUR"), rates.get("MDL")) {
            if *usd_eur > 0.0 && quote_currencies.iter().any(|c| c == "MDL") {
                pairs.push(RatePair {
                    label: "EUR→MDL".to_string(),
                    rate: usd_mdl / usd_eur,
                });
            }
        }

        Ok(FxRecord { pairs })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
