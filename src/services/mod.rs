//! Client services

pub mod auth;
pub mod books;
pub mod cache;
pub mod http;
pub mod session;
pub mod token_watch;
pub mod weather;

use crate::{
    config::ClientConfig,
    error::AppResult,
    services::{cache::EntityCache, http::ApiClient, session::SessionStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub weather: weather::WeatherService,
}

impl Services {
    /// Create all services on top of one session and one cache
    pub fn new(config: &ClientConfig, session: SessionStore, cache: EntityCache) -> AppResult<Self> {
        let api = ApiClient::new(&config.api, session.clone())?;

        Ok(Self {
            auth: auth::AuthService::new(api.clone(), session),
            books: books::BooksService::new(api.clone(), cache),
            weather: weather::WeatherService::new(api, config.weather.clone()),
        })
    }
}
