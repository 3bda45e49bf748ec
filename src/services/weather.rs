//! Weather service, proxied through the library backend

use serde::Serialize;

use crate::{
    config::WeatherConfig,
    error::{AppError, AppResult},
    models::weather::{
        CurrentWeatherResponse, DailyForecastResponse, ForecastResponse, Units, WeatherQuery,
    },
    services::http::ApiClient,
};

const BASE_PATH: &str = "/weather";
const MIN_DAYS: u32 = 1;
const MAX_DAYS: u32 = 16;

/// Query string sent to the backend
#[derive(Debug, PartialEq, Serialize)]
struct WeatherParams<'a> {
    lat: f64,
    lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
    units: Units,
    lang: &'a str,
}

#[derive(Clone)]
pub struct WeatherService {
    api: ApiClient,
    defaults: WeatherConfig,
}

impl WeatherService {
    pub fn new(api: ApiClient, defaults: WeatherConfig) -> Self {
        Self { api, defaults }
    }

    pub async fn get_current_weather(&self, query: &WeatherQuery) -> AppResult<CurrentWeatherResponse> {
        self.fetch("/current", &self.params(query, false)).await
    }

    /// Forecast in 3-hour steps
    pub async fn get_forecast_3hourly(&self, query: &WeatherQuery) -> AppResult<ForecastResponse> {
        self.fetch("/forecast/3hourly", &self.params(query, false)).await
    }

    /// Daily forecast; `days` is clamped to 1..=16
    pub async fn get_forecast_daily(&self, query: &WeatherQuery) -> AppResult<DailyForecastResponse> {
        self.fetch("/forecast/daily", &self.params(query, true)).await
    }

    fn params<'a>(&'a self, query: &'a WeatherQuery, with_days: bool) -> WeatherParams<'a> {
        WeatherParams {
            lat: query.lat,
            lon: query.lon,
            days: with_days.then(|| {
                query
                    .days
                    .unwrap_or(self.defaults.days)
                    .clamp(MIN_DAYS, MAX_DAYS)
            }),
            units: query.units.unwrap_or(self.defaults.units),
            lang: query.lang.as_deref().unwrap_or(&self.defaults.lang),
        }
    }

    async fn fetch<T>(&self, path: &str, params: &WeatherParams<'_>) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!("Fetching weather {} for lat={}, lon={}", path, params.lat, params.lon);
        self.api
            .get_with_query(&format!("{}{}", BASE_PATH, path), params)
            .await
            .map_err(|e| AppError::Network(e.into_message("Error loading weather data")))
    }
}
