//! Book CRUD service with read-through caching

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{BookResponse, BooksResponse, CreateBook, MessageResponse, UpdateBook},
    services::{cache::EntityCache, http::ApiClient},
};

pub const BOOKS_PATH: &str = "/app/books";

/// Path, and cache key, of a single book
pub fn book_path(id: i64) -> String {
    format!("{}/{}", BOOKS_PATH, id)
}

#[derive(Clone)]
pub struct BooksService {
    api: ApiClient,
    cache: EntityCache,
}

impl BooksService {
    pub fn new(api: ApiClient, cache: EntityCache) -> Self {
        Self { api, cache }
    }

    /// List all books. With `use_cache == false` the network is always hit;
    /// the fresh list is cached either way.
    pub async fn get_all_books(&self, use_cache: bool) -> AppResult<BooksResponse> {
        if use_cache {
            if let Some(cached) = self.cache.get_as::<BooksResponse>(BOOKS_PATH) {
                return Ok(cached);
            }
        }

        let response: BooksResponse = self
            .api
            .get(BOOKS_PATH)
            .await
            .map_err(|e| AppError::Network(e.into_message("Error fetching books")))?;

        self.cache.set(BOOKS_PATH, &response);
        Ok(response)
    }

    pub async fn get_book_by_id(&self, id: i64, use_cache: bool) -> AppResult<BookResponse> {
        let path = book_path(id);
        if use_cache {
            if let Some(cached) = self.cache.get_as::<BookResponse>(&path) {
                return Ok(cached);
            }
        }

        let response: BookResponse = self
            .api
            .get(&path)
            .await
            .map_err(|e| AppError::Network(e.into_message("Error fetching book")))?;

        self.cache.set(&path, &response);
        Ok(response)
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<BookResponse> {
        data.validate()?;

        let response: BookResponse = self
            .api
            .post(BOOKS_PATH, data)
            .await
            .map_err(|e| AppError::Network(e.into_message("Error creating book")))?;

        self.cache.remove(BOOKS_PATH);
        tracing::info!("Created book {} ({})", response.book.id, response.book.title);
        Ok(response)
    }

    pub async fn update_book(&self, id: i64, data: &UpdateBook) -> AppResult<BookResponse> {
        data.validate()?;

        let path = book_path(id);
        let response: BookResponse = self
            .api
            .put(&path, data)
            .await
            .map_err(|e| AppError::Network(e.into_message("Error updating book")))?;

        self.cache.remove(BOOKS_PATH);
        self.cache.remove(&path);
        tracing::info!("Updated book {}", id);
        Ok(response)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<MessageResponse> {
        let path = book_path(id);
        let response: MessageResponse = self
            .api
            .delete(&path)
            .await
            .map_err(|e| AppError::Network(e.into_message("Error deleting book")))?;

        self.cache.remove(BOOKS_PATH);
        self.cache.remove(&path);
        tracing::info!("Deleted book {}", id);
        Ok(response)
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate(None);
    }
}
