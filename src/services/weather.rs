//! Current-temperature lookup against the OpenWeatherMap API.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::WeatherError;
use crate::models::config::WeatherConfig;

/// Environment variable holding the OpenWeatherMap API key
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "THERMOCHECK_WEATHER_URL";

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: Option<MainBlock>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// One successful lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// City as requested by the user
    pub city: String,
    /// City name as resolved by the service
    pub resolved_name: Option<String>,
    /// Temperature in °C as reported
    pub temperature: f64,
    /// Temperature rounded to a whole degree
    pub rounded: i32,
}

/// Round a reported temperature to a whole degree, ties to even (26.5 → 26, 27.5 → 28)
pub fn round_temperature(value: f64) -> i32 {
    value.round_ties_even() as i32
}

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, api_key: Option<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(WeatherError::network)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Build a client whose API key comes from `OPENWEATHER_API_KEY`
    pub fn from_env(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = std::env::var(API_KEY_ENV).ok();
        if api_key.is_none() {
            tracing::warn!("{} is not set; weather lookups will fail", API_KEY_ENV);
        }
        Self::new(config, api_key)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Current temperature for `city`, rounded to a whole degree
    pub async fn current_temperature(&self, city: &str) -> Result<i32, WeatherError> {
        Ok(self.current_reading(city).await?.rounded)
    }

    /// Fetch the current reading for `city` in metric units.
    ///
    /// One request, no retry, no caching.
    pub async fn current_reading(&self, city: &str) -> Result<WeatherReading, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        tracing::debug!(city, "Requesting current weather");

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(WeatherError::network)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

            tracing::warn!(city, status = status.as_u16(), %message, "Weather lookup failed");

            return Err(match status {
                StatusCode::NOT_FOUND => WeatherError::CityNotFound {
                    city: city.to_string(),
                },
                StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
                _ => WeatherError::Status {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: CurrentWeatherResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.without_url().to_string()))?;

        let temperature = body
            .main
            .and_then(|main| main.temp)
            .ok_or_else(|| WeatherError::MissingTemperature {
                city: city.to_string(),
            })?;

        let reading = WeatherReading {
            city: city.to_string(),
            resolved_name: body.name,
            temperature,
            rounded: round_temperature(temperature),
        };

        tracing::info!(city, temperature, rounded = reading.rounded, "Fetched current temperature");
        Ok(reading)
    }
}
