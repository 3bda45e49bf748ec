//! Biblio client
//!
//! A typed client for the personal library API: account registration and
//! login with a per-instance session, book CRUD behind a TTL read-through
//! cache, and the backend's weather proxy.

use std::sync::Arc;

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::ClientConfig;
pub use error::{AppError, AppResult};

use clock::{Clock, SystemClock};
use services::{cache::EntityCache, session::SessionStore};
use storage::{FileStorage, MemoryStorage, SessionStorage};

/// One client instance; the equivalent of a single browser tab.
///
/// The session lives in memory and is gone when the instance is dropped.
#[derive(Clone)]
pub struct LibraryClient {
    pub config: Arc<ClientConfig>,
    pub services: Arc<services::Services>,
    session: SessionStore,
    cache: EntityCache,
}

impl LibraryClient {
    /// Build a client with in-memory session storage and the system clock.
    /// Leftover sessions in the configured legacy file are purged.
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let legacy = config
            .session
            .legacy_store_path
            .as_ref()
            .map(FileStorage::new);

        Self::with_parts(
            config,
            Arc::new(MemoryStorage::new()),
            legacy.as_ref().map(|l| l as &dyn SessionStorage),
            Arc::new(SystemClock),
        )
    }

    /// Build a client from explicit storage areas and clock
    pub fn with_parts(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
        legacy: Option<&dyn SessionStorage>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let ttl = config.cache.ttl()?;
        let session = SessionStore::open(storage, legacy, clock.clone());
        let cache = EntityCache::new(ttl, clock);
        let services = services::Services::new(&config, session.clone(), cache.clone())?;

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            session,
            cache,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }
}
