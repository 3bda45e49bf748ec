//! Periodic token metadata refresh for views that display it
//!
//! The task only recomputes [`SessionStore::token_info`] locally; it never
//! touches the network. It stops when the [`TokenWatch`] is cancelled or
//! dropped.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::{
    error::{AppError, AppResult},
    models::TokenInfo,
    services::session::SessionStore,
};

pub struct TokenWatch {
    handle: JoinHandle<()>,
}

impl TokenWatch {
    /// Call `on_tick` with fresh token metadata every `period`, starting now.
    /// Must be called from within a tokio runtime. `period` must be non-zero.
    pub fn spawn<F>(session: SessionStore, period: Duration, mut on_tick: F) -> AppResult<Self>
    where
        F: FnMut(Option<TokenInfo>) + Send + 'static,
    {
        if period.is_zero() {
            return Err(AppError::Validation(
                "Token watch period must be greater than zero".to_string(),
            ));
        }

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                on_tick(session.token_info());
            }
        });
        Ok(Self { handle })
    }

    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TokenWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
