//! DAYBRIEF — scheduled crypto, weather and FX digest bot
//!
//! Entry point. Loads configuration, initialises structured logging,
//! resolves credentials from the environment, and runs the
//! fetch → compose → deliver pipeline once or on a fixed interval
//! with graceful shutdown.

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};

use daybrief::compose::Composer;
use daybrief::config::AppConfig;
use daybrief::delivery::TelegramNotifier;
use daybrief::pipeline::Pipeline;
use daybrief::sources::fx::FxSource;
use daybrief::sources::markets::MarketStatsSource;
use daybrief::sources::prices::PriceSource;
use daybrief::sources::trending::TrendingSource;
use daybrief::sources::weather::WeatherSource;

const BANNER: &str = r#"
 ____   _____   __ ____  ____  ___ _____ _____
|  _ \ / \ \ \ / /| __ )|  _ \|_ _| ____|  ___|
| | | / _ \ \ V / |  _ \| |_) || ||  _| | |_
| |_| / ___ \ | |  | |_) |  _ < | || |___|  _|
|____/_/   \_\|_|  |____/|_| \_\___|_____|_|

  Daily crypto / weather / FX digest
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    println!("{BANNER}");
    info!(
        cities = ?cfg.digest.cities,
        tracked_assets = cfg.assets.tracked.len(),
        loop_interval_secs = ?cfg.digest.loop_interval_secs,
        "DAYBRIEF starting up"
    );

    // -- Resolve secrets once, up front --------------------------------

    let openweather_key = AppConfig::resolve_env(cfg.sources.openweather_key_env.as_deref());
    let cmc_key = AppConfig::resolve_env(cfg.sources.cmc_key_env.as_deref());
    let bot_token = AppConfig::resolve_env(cfg.delivery.telegram_bot_token_env.as_deref());
    let chat_id = AppConfig::resolve_env(cfg.delivery.telegram_chat_id_env.as_deref());

    if openweather_key.is_none() {
        warn!("No OpenWeatherMap key — weather will be absent from every digest");
    }
    if cmc_key.is_none() {
        warn!("No CoinMarketCap key — market stats will be absent from every digest");
    }
    if bot_token.is_none() || chat_id.is_none() {
        warn!("Telegram credentials incomplete — every run will fail at delivery");
    }

    // -- Build the pipeline --------------------------------------------

    let pipeline = Pipeline::new(
        PriceSource::new(cfg.assets.tracked.clone())?,
        MarketStatsSource::new(cmc_key, cfg.assets.stat_symbols.clone())?,
        TrendingSource::new()?,
        FxSource::new(cfg.fx.quote_currencies.clone())?,
        WeatherSource::new(openweather_key, cfg.digest.cities.clone())?,
        Composer::new(cfg.digest.utc_offset_hours),
        TelegramNotifier::new(bot_token, chat_id)?,
    );

    // -- Run -----------------------------------------------------------

    match cfg.digest.loop_interval_secs {
        None => {
            let outcome = pipeline.run_once().await?;
            info!(%outcome, "Single-shot run complete");
        }
        Some(secs) => {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            let shutdown = tokio::signal::ctrl_c();
            tokio::pin!(shutdown);

            info!(interval_secs = secs, "Entering digest loop. Press Ctrl+C to stop.");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // No iteration failure is fatal — the next tick
                        // starts fresh regardless.
                        match pipeline.run_once().await {
                            Ok(outcome) => info!(%outcome, "Run complete"),
                            Err(e) => {
                                error!(error = format!("{e:#}"), "Run failed — continuing to next");
                            }
                        }
                    }
                    _ = &mut shutdown => {
                        info!("Shutdown signal received.");
                        break;
                    }
                }
            }

            info!("DAYBRIEF shut down cleanly.");
        }
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("daybrief=info"));

    let json_logging = std::env::var("DAYBRIEF_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
