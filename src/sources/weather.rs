//! Weather index adapter.
//!
//! Fetches current conditions for every configured city from the
//! OpenWeatherMap current-weather endpoint, one GET per city. The
//! cities form a single record: if any city fails, the whole record
//! is absent for this run.
//!
//! API: `https://api.openweathermap.org/data/2.5/weather`
//! Auth: API key via `appid` query param. Free registration.
//! Rate limit: 60 req/min on the free tier.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::types::WeatherRecord;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// Current-weather response. `main`, `weather`, `wind` and `sys` are
/// required — a body without them is malformed and fails the fetch.
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: WeatherMain,
    weather: Vec<WeatherCondition>,
    wind: WeatherWind,
    sys: WeatherSys,
    /// Location UTC offset in seconds.
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherSys {
    /// UTC epoch seconds.
    sunrise: i64,
    sunset: i64,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct WeatherSource {
    http: Client,
    api_key: Option<String>,
    cities: Vec<String>,
}

impl WeatherSource {
    /// `api_key` is resolved by the caller; without one every fetch
    /// fails immediately and the run proceeds without this source.
    pub fn new(api_key: Option<String>, cities: Vec<String>) -> Result<Self> {
        Ok(Self {
            http: super::http_client("weather")?,
            api_key,
            cities,
        })
    }

    /// Fetch current conditions for all configured cities, in order.
    pub async fn fetch(&self) -> Result<Vec<WeatherRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("No OpenWeatherMap API key configured")?;

        let mut records = Vec::with_capacity(self.cities.len());
        for city in &self.cities {
            let record = self
                .fetch_city(city, api_key)
                .await
                .with_context(|| format!("Weather fetch failed for {city}"))?;
            records.push(record);
        }
        Ok(records)
    }

    async fn fetch_city(&self, city: &str, api_key: &str) -> Result<WeatherRecord> {
        let url = format!(
            "{BASE_URL}/weather?q={}&appid={api_key}&units=metric",
            urlencoding::encode(city)
        );

        debug!(city = %city, "Fetching current weather");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("OpenWeatherMap request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("OpenWeatherMap API error: {status}");
        }

        let body: CurrentWeatherResponse = resp
            .json()
            .await
            .context("Failed to parse OpenWeatherMap response")?;

        Self::to_record(city, &body)
    }

    /// Map the response onto a record, formatting sunrise/sunset in
    /// the location's own zone.
    fn to_record(city: &str, body: &CurrentWeatherResponse) -> Result<WeatherRecord> {
        let description = body
            .weather
            .first()
            .map(|c| capitalise(&c.description))
            .context("No weather condition in response")?;

        Ok(WeatherRecord {
            city: city.to_string(),
            temperature: body.main.temp,
            feels_like: body.main.feels_like,
            temp_min: body.main.temp_min,
            temp_max: body.main.temp_max,
            humidity: body.main.humidity,
            wind_speed: body.wind.speed,
            description,
            sunrise: format_clock(body.sys.sunrise, body.timezone),
            sunset: format_clock(body.sys.sunset, body.timezone),
        })
    }
}

/// Render a UTC epoch plus a UTC offset as a 12-hour clock string.
///
/// Pure arithmetic on epoch seconds — no timezone database. The
/// offset is simply added before reducing modulo one day, so
/// `format_clock(e, o) == format_clock(e + o, 0)` for any integers.
pub fn format_clock(epoch: i64, utc_offset_secs: i64) -> String {
    let seconds_of_day = (epoch + utc_offset_secs).rem_euclid(86_400);
    let hour = seconds_of_day / 3600;
    let minute = (seconds_of_day % 3600) / 60;
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minute:02} {meridiem}")
}

/// Upper-case the first letter, as the upstream descriptions arrive
/// all-lowercase ("scattered clouds").
fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
