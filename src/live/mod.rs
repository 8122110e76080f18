//! Live observation client for the OpenWeather API
//!
//! Fetches current air pollution, current weather, and the 5-day/3-hour
//! forecast for a city's coordinates. Every call has a fixed 10-second
//! timeout and no retries; failures are reported through [`FetchError`] so
//! callers can degrade to an absent data point instead of aborting.

pub mod aqi;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cities::City;

pub use aqi::{compute_index, AqiCategory};

const BASE_URL: &str = "http://api.openweathermap.org/data/2.5";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure taxonomy for one external-provider call.
///
/// All variants are expected conditions: the caller omits the data point
/// and carries on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Air quality observation with the derived India AQI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqiReading {
    pub aqi: u32,
    pub category: AqiCategory,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
}

impl AqiReading {
    /// Derive a reading from raw pollutant concentrations.
    pub fn from_components(pm25: f64, pm10: f64, co: f64, no2: f64) -> Self {
        let aqi = compute_index(pm25);
        Self {
            aqi,
            category: AqiCategory::from_index(aqi),
            pm25,
            pm10,
            co,
            no2,
        }
    }
}

/// Current weather observation in metric units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub desc: String,
}

/// One 3-hour-resolution forecast sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Provider timestamp, `YYYY-MM-DD HH:MM:SS`
    pub stamp: String,
    pub temp: f64,
    pub humidity: f64,
    pub desc: String,
    pub wind: f64,
}

/// Source of live observations, injectable for testing.
#[async_trait]
pub trait LiveDataProvider: Send + Sync {
    async fn air_quality(&self, city: &City) -> Result<AqiReading, FetchError>;
    async fn weather(&self, city: &City) -> Result<WeatherReading, FetchError>;
    async fn forecast(&self, city: &City, days: usize) -> Result<Vec<ForecastPoint>, FetchError>;
}

/// OpenWeather-backed [`LiveDataProvider`].
#[derive(Debug, Clone)]
pub struct LiveDataClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl LiveDataClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &City,
        metric: bool,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let lat = city.lat.to_string();
        let lon = city.lon.to_string();
        let mut params = vec![
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", self.api_key.as_str()),
        ];
        if metric {
            params.push(("units", "metric"));
        }

        let res = self.http.get(&url).query(&params).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Payload(e.to_string()))
    }
}

#[async_trait]
impl LiveDataProvider for LiveDataClient {
    async fn air_quality(&self, city: &City) -> Result<AqiReading, FetchError> {
        let payload: AirPollutionPayload = self.get_json("air_pollution", city, false).await?;
        let sample = payload
            .list
            .first()
            .ok_or_else(|| FetchError::Payload("air pollution response has no samples".into()))?;

        let c = &sample.components;
        Ok(AqiReading::from_components(c.pm2_5, c.pm10, c.co, c.no2))
    }

    async fn weather(&self, city: &City) -> Result<WeatherReading, FetchError> {
        let payload: WeatherPayload = self.get_json("weather", city, true).await?;
        let desc = payload
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_default();

        Ok(WeatherReading {
            temp: payload.main.temp,
            feels_like: payload.main.feels_like,
            humidity: payload.main.humidity,
            pressure: payload.main.pressure,
            wind_speed: payload.wind.speed,
            desc,
        })
    }

    async fn forecast(&self, city: &City, days: usize) -> Result<Vec<ForecastPoint>, FetchError> {
        let payload: ForecastPayload = self.get_json("forecast", city, true).await?;

        // The provider returns fixed 3-hour granularity: 8 samples per day.
        let points = payload
            .list
            .into_iter()
            .take(days * 8)
            .map(|entry| ForecastPoint {
                stamp: entry.dt_txt,
                temp: entry.main.temp,
                humidity: entry.main.humidity,
                desc: entry
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .unwrap_or_default(),
                wind: entry.wind.speed,
            })
            .collect();

        Ok(points)
    }
}

// Wire formats, see the OpenWeather API reference.

#[derive(Debug, Deserialize)]
struct AirPollutionPayload {
    list: Vec<AirSample>,
}

#[derive(Debug, Deserialize)]
struct AirSample {
    components: Components,
}

#[derive(Debug, Default, Deserialize)]
struct Components {
    #[serde(default)]
    pm2_5: f64,
    #[serde(default)]
    pm10: f64,
    #[serde(default)]
    co: f64,
    #[serde(default)]
    no2: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    main: MainFields,
    weather: Vec<DescField>,
    wind: WindField,
}

#[derive(Debug, Deserialize)]
struct MainFields {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct DescField {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WindField {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt_txt: String,
    main: MainFields,
    weather: Vec<DescField>,
    wind: WindField,
}
