//! The fetch → aggregate → format → deliver pipeline.
//!
//! One `run_once` call is one complete run: all five sources are
//! fetched concurrently (they are independent and side-effect-free),
//! failures degrade to absent records, and the composer decides
//! whether anything gets delivered at all.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::compose::Composer;
use crate::delivery::Notifier;
use crate::sources::fx::FxSource;
use crate::sources::markets::MarketStatsSource;
use crate::sources::prices::PriceSource;
use crate::sources::trending::TrendingSource;
use crate::sources::weather::WeatherSource;
use crate::types::{RunOutcome, Snapshot};

pub struct Pipeline<N: Notifier> {
    prices: PriceSource,
    markets: MarketStatsSource,
    trending: TrendingSource,
    fx: FxSource,
    weather: WeatherSource,
    composer: Composer,
    notifier: N,
}

impl<N: Notifier> Pipeline<N> {
    pub fn new(
        prices: PriceSource,
        markets: MarketStatsSource,
        trending: TrendingSource,
        fx: FxSource,
        weather: WeatherSource,
        composer: Composer,
        notifier: N,
    ) -> Self {
        Self {
            prices,
            markets,
            trending,
            fx,
            weather,
            composer,
            notifier,
        }
    }

    /// Execute one full run.
    pub async fn run_once(&self) -> Result<RunOutcome> {
        let snapshot = self.gather().await;
        self.publish(&snapshot).await
    }

    /// Fetch all sources concurrently, degrading each failure to an
    /// absent record.
    pub async fn gather(&self) -> Snapshot {
        let (prices, stats, trending, rates, weather) = futures::join!(
            self.prices.fetch(),
            self.markets.fetch(),
            self.trending.fetch(),
            self.fx.fetch(),
            self.weather.fetch(),
        );

        Snapshot {
            prices: ok_or_absent("prices", prices),
            stats: ok_or_absent("markets", stats),
            trending: ok_or_absent("trending", trending),
            rates: ok_or_absent("fx", rates),
            weather: ok_or_absent("weather", weather),
        }
    }

    /// Compose and deliver a gathered snapshot.
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<RunOutcome> {
        let Some(digest) = self.composer.compose(snapshot) else {
            info!(
                missing = ?snapshot.missing_sources(),
                "Snapshot incomplete — no digest this run"
            );
            return Ok(RunOutcome::Skipped);
        };

        self.notifier
            .deliver(&digest.text)
            .await
            .context("Delivery failed")?;

        info!(chars = digest.text.len(), "Digest delivered");
        Ok(RunOutcome::Delivered)
    }
}

/// Treat a source failure as "no data this run" and keep going.
fn ok_or_absent<T>(source: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(source, error = format!("{e:#}"), "Source fetch failed, continuing without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_ok_or_absent_keeps_value() {
        assert_eq!(ok_or_absent("test", Ok(7)), Some(7));
    }

    #[test]
    fn test_ok_or_absent_swallows_error() {
        let result: Result<i32> = Err(anyhow!("boom"));
        assert_eq!(ok_or_absent("test", result), None);
    }
}
