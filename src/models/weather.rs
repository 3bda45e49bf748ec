//! Weather types (Weatherbit data relayed by the backend)

use serde::{Deserialize, Serialize};

/// Unit system requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(format!("Invalid unit system: {}", s)),
        }
    }
}

/// Weather lookup parameters; unset fields fall back to the configured defaults
#[derive(Debug, Clone, Default)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    pub units: Option<Units>,
    pub lang: Option<String>,
    pub days: Option<u32>,
}

impl WeatherQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Default::default()
        }
    }

    pub fn for_city(city: &CityLocation) -> Self {
        Self::new(city.lat, city.lon)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherDescription {
    pub code: i32,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentWeatherData {
    pub city_name: String,
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    pub temp: f64,
    pub app_temp: f64,
    pub rh: f64,
    pub wind_spd: f64,
    pub wind_cdir: String,
    pub wind_cdir_full: String,
    pub clouds: f64,
    pub precip: Option<f64>,
    pub snow: Option<f64>,
    pub uv: Option<f64>,
    pub aqi: Option<f64>,
    pub weather: WeatherDescription,
    pub datetime: String,
    pub ob_time: String,
    pub ts: i64,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentWeatherResponse {
    pub count: u32,
    pub data: Vec<CurrentWeatherData>,
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastData {
    pub timestamp_local: String,
    pub timestamp_utc: String,
    pub ts: i64,
    pub temp: f64,
    pub app_temp: f64,
    pub rh: f64,
    pub wind_spd: f64,
    pub wind_cdir: String,
    pub wind_cdir_full: String,
    pub clouds: f64,
    pub precip: Option<f64>,
    pub snow: Option<f64>,
    pub weather: WeatherDescription,
    pub pop: Option<f64>,
    pub pres: Option<f64>,
    pub dewpt: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastResponse {
    pub city_name: String,
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
    pub state_code: String,
    pub timezone: String,
    pub data: Vec<ForecastData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyForecastData {
    pub valid_date: String,
    pub ts: i64,
    pub datetime: String,
    pub temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub app_max_temp: Option<f64>,
    pub app_min_temp: Option<f64>,
    pub rh: f64,
    pub clouds: f64,
    pub wind_spd: f64,
    pub wind_cdir: String,
    pub wind_cdir_full: String,
    pub precip: Option<f64>,
    pub snow: Option<f64>,
    pub snow_depth: Option<f64>,
    pub pop: Option<f64>,
    pub weather: WeatherDescription,
    pub uv: Option<f64>,
    pub max_dhi: Option<f64>,
    pub sunrise_ts: Option<i64>,
    pub sunset_ts: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyForecastResponse {
    pub city_name: String,
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
    pub state_code: String,
    pub timezone: String,
    pub data: Vec<DailyForecastData>,
}

/// Preset location offered by the weather view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityLocation {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub country: &'static str,
}

pub const CITIES: &[CityLocation] = &[
    CityLocation { name: "Ciudad de México", lat: 19.4326, lon: -99.1332, country: "MX" },
    CityLocation { name: "Guadalajara", lat: 20.6597, lon: -103.3496, country: "MX" },
    CityLocation { name: "Monterrey", lat: 25.6866, lon: -100.3161, country: "MX" },
    CityLocation { name: "Cancún", lat: 21.1619, lon: -86.8515, country: "MX" },
    CityLocation { name: "Nueva York", lat: 40.7128, lon: -74.006, country: "US" },
    CityLocation { name: "Londres", lat: 51.5074, lon: -0.1278, country: "GB" },
    CityLocation { name: "Tokio", lat: 35.6762, lon: 139.6503, country: "JP" },
    CityLocation { name: "Madrid", lat: 40.4168, lon: -3.7038, country: "ES" },
];

/// Case-insensitive lookup in [`CITIES`]
pub fn find_city(name: &str) -> Option<&'static CityLocation> {
    let wanted = name.trim().to_lowercase();
    CITIES.iter().find(|c| c.name.to_lowercase() == wanted)
}
