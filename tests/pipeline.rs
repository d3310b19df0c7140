//! End-to-end pipeline tests.
//!
//! Drives compose → deliver with a deterministic in-memory notifier —
//! no external dependencies, all state controllable from test code.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use daybrief::compose::Composer;
use daybrief::config::TrackedAsset;
use daybrief::delivery::{DeliveryError, Notifier, TelegramNotifier};
use daybrief::pipeline::Pipeline;
use daybrief::sources::fx::FxSource;
use daybrief::sources::markets::MarketStatsSource;
use daybrief::sources::prices::PriceSource;
use daybrief::sources::trending::TrendingSource;
use daybrief::sources::weather::WeatherSource;
use daybrief::types::*;

// ---------------------------------------------------------------------------
// Mock notifier
// ---------------------------------------------------------------------------

/// A mock delivery sink recording every message in memory.
#[derive(Clone, Default)]
struct MockNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    /// If set, all deliveries fail with an API rejection.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockNotifier {
    fn new() -> Self {
        Self::default()
    }

    fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(DeliveryError::Api {
                status: reqwest::StatusCode::FORBIDDEN,
                body: msg,
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn build_pipeline<N: Notifier>(notifier: N) -> Pipeline<N> {
    let tracked = vec![TrackedAsset {
        id: "bitcoin".to_string(),
        name: "Bitcoin".to_string(),
    }];
    Pipeline::new(
        PriceSource::new(tracked).unwrap(),
        MarketStatsSource::new(None, vec!["BTC".to_string()]).unwrap(),
        TrendingSource::new().unwrap(),
        FxSource::new(vec!["MDL".to_string()]).unwrap(),
        WeatherSource::new(None, vec!["Chisinau".to_string()]).unwrap(),
        Composer::new(3),
        notifier,
    )
}

/// Fixed sample values for all five sources.
fn full_snapshot() -> Snapshot {
    Snapshot {
        prices: Some(PriceRecord {
            assets: vec![
                AssetPrice {
                    name: "Bitcoin".to_string(),
                    price: 67123.45,
                },
                AssetPrice {
                    name: "Pepe".to_string(),
                    price: 0.00000712,
                },
            ],
        }),
        stats: Some(MarketStatsRecord {
            entries: vec![AssetStats {
                name: "Bitcoin".to_string(),
                symbol: "BTC".to_string(),
                price: 67123.45,
                change_24h: Some(-1.4),
                market_cap: Some(1_320_000_000_000.0),
                volume_24h: Some(31_000_000_000.0),
            }],
            btc_dominance: 52.3,
        }),
        trending: Some(TrendingRecord {
            name: "Bonk".to_string(),
            symbol: "BONK".to_string(),
            icon_url: "https://example.com/bonk.png".to_string(),
            price_btc: 0.000000000172345,
            market_cap: None,
            total_volume: None,
        }),
        rates: Some(FxRecord {
            pairs: vec![RatePair {
                label: "USD→MDL".to_string(),
                rate: 17.45,
            }],
        }),
        weather: Some(vec![WeatherRecord {
            city: "Chisinau".to_string(),
            temperature: 21.4,
            feels_like: 20.9,
            temp_min: 19.0,
            temp_max: 23.1,
            humidity: 47.0,
            wind_speed: 3.6,
            description: "Scattered clouds".to_string(),
            sunrise: "5:42 AM".to_string(),
            sunset: "8:31 PM".to_string(),
        }]),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_snapshot_delivers_exactly_one_message_with_values_verbatim() {
    let notifier = MockNotifier::new();
    let pipeline = build_pipeline(notifier.clone());

    let outcome = pipeline.publish(&full_snapshot()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Delivered);

    let sent = notifier.sent_messages();
    assert_eq!(sent.len(), 1);

    let text = &sent[0];
    assert!(text.contains("67123.45"));
    assert!(text.contains("0.00000712"));
    assert!(text.contains("Chisinau: 21.40°C"));
    assert!(text.contains("Scattered clouds"));
    assert!(text.contains("BTC dominance: 52.30%"));
    assert!(text.contains("Bonk (BONK)"));
    assert!(text.contains("USD→MDL: 17.45"));
}

#[tokio::test]
async fn missing_source_skips_run_and_sends_nothing() {
    let notifier = MockNotifier::new();
    let pipeline = build_pipeline(notifier.clone());

    for missing in ["prices", "stats", "trending", "rates", "weather"] {
        let mut snapshot = full_snapshot();
        match missing {
            "prices" => snapshot.prices = None,
            "stats" => snapshot.stats = None,
            "trending" => snapshot.trending = None,
            "rates" => snapshot.rates = None,
            "weather" => snapshot.weather = None,
            _ => unreachable!(),
        }
        let outcome = pipeline.publish(&snapshot).await.unwrap();
        assert_eq!(outcome, RunOutcome::Skipped, "missing {missing}");
    }

    assert!(notifier.sent_messages().is_empty());
}

#[tokio::test]
async fn delivery_rejection_fails_the_run() {
    let notifier = MockNotifier::new();
    notifier.set_error("chat not found");
    let pipeline = build_pipeline(notifier.clone());

    let result = pipeline.publish(&full_snapshot()).await;
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("chat not found"));
    assert!(notifier.sent_messages().is_empty());
}

#[tokio::test]
async fn unset_credentials_fail_before_any_network_call() {
    // Real Telegram notifier, no credentials, unreachable endpoint:
    // the failure must be the credential check, not a transport error.
    let notifier = TelegramNotifier::new(None, None)
        .unwrap()
        .with_api_base("http://127.0.0.1:9");
    let pipeline = build_pipeline(notifier);

    let err = pipeline.publish(&full_snapshot()).await.unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("credential missing"), "got: {chain}");
}

#[tokio::test]
async fn trending_degrades_to_placeholder_instead_of_skipping() {
    // Trending cap/volume absent is field-level degradation, not a
    // missing record — the run still delivers.
    let notifier = MockNotifier::new();
    let pipeline = build_pipeline(notifier.clone());

    let outcome = pipeline.publish(&full_snapshot()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Delivered);
    assert!(notifier.sent_messages()[0].contains("Market cap: N/A"));
}
