//! Digest composer.
//!
//! Renders one run's snapshot into the fixed multi-section digest
//! text. Composition is all-or-nothing: every source record must be
//! present or no digest is produced at all. The only exceptions are
//! field-level — trending market cap/volume render "N/A" and an
//! absent 24h change counts as non-positive for the trend arrow.

use chrono::Utc;

use crate::types::{Digest, Snapshot};

/// Placeholder for optional fields absent at render time.
const UNAVAILABLE: &str = "N/A";

const TREND_UP: &str = "📈";
const TREND_DOWN: &str = "📉";

const MORNING_GREETING: &str =
    "Good morning! ☀️ Your daily digest is here, fresh off the wire 🦀";
const EVENING_GREETING: &str = "Good evening! 🌙 Here's where the day ended up 🦀";

pub struct Composer {
    utc_offset_secs: i64,
}

impl Composer {
    pub fn new(utc_offset_hours: i64) -> Self {
        Self {
            utc_offset_secs: utc_offset_hours * 3600,
        }
    }

    /// Render the digest, or `None` when any source is absent —
    /// signalling "skip this run's delivery".
    pub fn compose(&self, snapshot: &Snapshot) -> Option<Digest> {
        let (Some(prices), Some(stats), Some(trending), Some(rates), Some(weather)) = (
            snapshot.prices.as_ref(),
            snapshot.stats.as_ref(),
            snapshot.trending.as_ref(),
            snapshot.rates.as_ref(),
            snapshot.weather.as_ref(),
        ) else {
            return None;
        };

        let mut parts = Vec::new();
        parts.push(greeting_for(self.local_hour()).to_string());
        parts.push(String::new());

        parts.push("🌤 Weather Updates:".to_string());
        for w in weather {
            parts.push(format!(
                "{}: {:.2}°C (feels like {:.2}°C), {}",
                w.city, w.temperature, w.feels_like, w.description
            ));
            parts.push(format!(
                "  min {:.2}°C / max {:.2}°C, humidity {:.0}%, wind {:.2} m/s",
                w.temp_min, w.temp_max, w.humidity, w.wind_speed
            ));
            parts.push(format!("  sunrise {}, sunset {}", w.sunrise, w.sunset));
        }
        parts.push(String::new());

        parts.push("💰 Crypto Prices Update:".to_string());
        for asset in &prices.assets {
            parts.push(format!("{}: ${}", asset.name, format_price(asset.price)));
        }
        parts.push(String::new());

        parts.push("📊 Market Snapshot:".to_string());
        for entry in &stats.entries {
            parts.push(format!(
                "{} ({}): ${} {} {} | cap {} | vol {}",
                entry.symbol,
                entry.name,
                format_price(entry.price),
                trend(entry.change_24h),
                entry
                    .change_24h
                    .map(|c| format!("{c:+.2}%"))
                    .unwrap_or_else(|| UNAVAILABLE.to_string()),
                format_usd(entry.market_cap),
                format_usd(entry.volume_24h),
            ));
        }
        parts.push(format!("BTC dominance: {:.2}%", stats.btc_dominance));
        parts.push(String::new());

        parts.push("🔥 Coin of the Day:".to_string());
        parts.push(format!("{} ({})", trending.name, trending.symbol));
        parts.push(format!("Price: {:.15} BTC", trending.price_btc));
        parts.push(format!("Market cap: {}", format_usd(trending.market_cap)));
        parts.push(format!(
            "Total volume: {}",
            format_usd(trending.total_volume)
        ));
        parts.push(trending.icon_url.clone());
        parts.push(String::new());

        parts.push("💱 Exchange Rates:".to_string());
        for pair in &rates.pairs {
            parts.push(pair.to_string());
        }

        Some(Digest::new(parts.join("\n")))
    }

    /// Current hour of day under the configured offset.
    fn local_hour(&self) -> u32 {
        let seconds_of_day = (Utc::now().timestamp() + self.utc_offset_secs).rem_euclid(86_400);
        (seconds_of_day / 3600) as u32
    }
}

/// One of exactly two greetings, split at midday.
pub fn greeting_for(hour: u32) -> &'static str {
    if hour < 12 {
        MORNING_GREETING
    } else {
        EVENING_GREETING
    }
}

/// Trend arrow for a signed 24h change. Absent counts as
/// non-positive, never propagates.
pub fn trend(change: Option<f64>) -> &'static str {
    match change {
        Some(c) if c > 0.0 => TREND_UP,
        _ => TREND_DOWN,
    }
}

/// Spot-price rendering policy: sub-cent assets get fixed 8-decimal
/// precision so they don't round to zero; everything else passes
/// through as received.
pub fn format_price(price: f64) -> String {
    if price > 0.0 && price < 0.01 {
        format!("{price:.8}")
    } else {
        format!("{price}")
    }
}

/// Two-decimal dollar amount, or the explicit placeholder.
fn format_usd(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => UNAVAILABLE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
