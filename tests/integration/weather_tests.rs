//! Weather proxy tests

use biblio_client::{
    models::{weather::find_city, Units, WeatherQuery},
    AppError,
};
use tokio_test::{assert_err, assert_ok};

use crate::support::spawn_backend;

#[tokio::test]
async fn test_current_weather_uses_defaults() {
    let server = spawn_backend().await;
    let client = server.logged_in_client().await;
    let madrid = find_city("Madrid").unwrap();

    let response = assert_ok!(
        client
            .services
            .weather
            .get_current_weather(&WeatherQuery::for_city(madrid))
            .await
    );

    assert_eq!(response.count, 1);
    assert_eq!(response.data[0].city_name, "Madrid");
    assert_eq!(response.data[0].aqi, None);
    assert_eq!(response.data[0].weather.description, "Cielo despejado");

    let query = server.state.lock().last_weather_query.clone().unwrap();
    assert_eq!(query["units"], "metric");
    assert_eq!(query["lang"], "es");
    assert_eq!(query["lat"], "40.4168");
    assert_eq!(query["lon"], "-3.7038");
    assert!(!query.contains_key("days"));
}

#[tokio::test]
async fn test_daily_forecast_clamps_days() {
    let server = spawn_backend().await;
    let client = server.logged_in_client().await;
    let query = WeatherQuery {
        days: Some(30),
        units: Some(Units::Imperial),
        lang: Some("en".to_string()),
        ..WeatherQuery::new(19.4326, -99.1332)
    };

    let response = assert_ok!(client.services.weather.get_forecast_daily(&query).await);

    assert_eq!(response.data.len(), 16);
    let sent = server.state.lock().last_weather_query.clone().unwrap();
    assert_eq!(sent["days"], "16");
    assert_eq!(sent["units"], "imperial");
    assert_eq!(sent["lang"], "en");
}

#[tokio::test]
async fn test_daily_forecast_default_days() {
    let server = spawn_backend().await;
    let client = server.logged_in_client().await;

    let response = assert_ok!(
        client
            .services
            .weather
            .get_forecast_daily(&WeatherQuery::new(51.5074, -0.1278))
            .await
    );

    assert_eq!(response.data.len(), 7);
    assert_eq!(response.data[0].snow_depth, None);
}

#[tokio::test]
async fn test_3hourly_forecast() {
    let server = spawn_backend().await;
    let client = server.logged_in_client().await;

    let response = assert_ok!(
        client
            .services
            .weather
            .get_forecast_3hourly(&WeatherQuery::new(35.6762, 139.6503))
            .await
    );

    assert_eq!(response.data.len(), 8);
    assert_eq!(response.data[1].timestamp_local, "2024-05-01T03:00:00");
}

#[tokio::test]
async fn test_weather_failure_carries_server_message() {
    let server = spawn_backend().await;
    let client = server.logged_in_client().await;
    server.state.lock().fail_weather = true;

    let err = assert_err!(
        client
            .services
            .weather
            .get_current_weather(&WeatherQuery::new(0.0, 0.0))
            .await
    );

    assert_eq!(err, AppError::Network("Timeout al consultar el servicio del clima".to_string()));
}

#[tokio::test]
async fn test_weather_requires_login() {
    let server = spawn_backend().await;
    let client = server.client();

    let err = assert_err!(
        client
            .services
            .weather
            .get_current_weather(&WeatherQuery::new(0.0, 0.0))
            .await
    );

    assert_eq!(err.message(), "Missing Authorization Header");
}
