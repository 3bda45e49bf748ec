//! Session store: bearer token and current user of one client instance

use std::sync::Arc;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{TokenInfo, TokenPayload, User},
    storage::SessionStorage,
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Reported as `time_remaining` once the token is past its `exp`
pub const EXPIRED: &str = "expired";

/// Standard alphabet, padding optional. URL-safe input is mapped onto it
/// before decoding so both encodings are accepted.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Open the session on top of the per-tab `storage`.
    ///
    /// Any `token`/`user` left in the long-lived `legacy` area is purged
    /// first; a failed purge is logged and does not block startup.
    pub fn open(
        storage: Arc<dyn SessionStorage>,
        legacy: Option<&dyn SessionStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if let Some(legacy) = legacy {
            purge_legacy(legacy);
        }
        Self { storage, clock }
    }

    /// Stored token, if any and non-empty
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Stored user; an unparseable record counts as no user
    pub fn current_user(&self) -> Option<User> {
        let raw = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("Ignoring corrupted user record: {}", e);
                None
            }
        }
    }

    /// Store token and user together. On failure the previous session is
    /// restored, or cleared if even that fails.
    pub fn store(&self, token: &str, user: &User) -> AppResult<()> {
        if token.is_empty() {
            return Err(AppError::Auth("Empty access token".to_string()));
        }
        let user_json = serde_json::to_string(user)
            .map_err(|e| AppError::Internal(format!("Failed to serialize user: {}", e)))?;

        let previous_token = self.storage.get_item(TOKEN_KEY);
        self.storage.set_item(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set_item(USER_KEY, &user_json) {
            self.restore_token(previous_token.as_deref());
            return Err(e);
        }
        Ok(())
    }

    /// Without a previous token any leftover user record goes too
    fn restore_token(&self, previous: Option<&str>) {
        let Some(token) = previous else {
            self.clear();
            return;
        };
        if let Err(e) = self.storage.set_item(TOKEN_KEY, token) {
            tracing::error!("Failed to restore previous token, clearing session: {}", e);
            self.clear();
        }
    }

    /// Remove token and user. Idempotent.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!("Failed to remove {} from session: {}", key, e);
            }
        }
    }

    /// Metadata of the stored token, computed against the current time
    pub fn token_info(&self) -> Option<TokenInfo> {
        let token = self.token()?;
        let payload = decode_token(&token)?;

        let now = self.clock.now();
        let expires_at = payload.exp().and_then(exp_to_datetime);
        let is_expired = expires_at.map_or(false, |at| at < now);
        let time_remaining = match expires_at {
            Some(at) if !is_expired => format_time_remaining(at - now),
            _ => EXPIRED.to_string(),
        };

        Some(TokenInfo {
            token,
            payload,
            expires_at,
            is_expired,
            time_remaining,
        })
    }
}

fn purge_legacy(legacy: &dyn SessionStorage) {
    let found = [TOKEN_KEY, USER_KEY]
        .iter()
        .any(|key| legacy.get_item(key).is_some());
    if !found {
        return;
    }

    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(e) = legacy.remove_item(key) {
            tracing::warn!("Failed to purge {} from persistent storage: {}", key, e);
            return;
        }
    }
    tracing::info!("Purged session data from persistent storage");
}

/// Decode the payload segment of a `header.payload.signature` token.
///
/// The signature is not verified. Any malformed input yields `None`.
pub fn decode_token(token: &str) -> Option<TokenPayload> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        tracing::debug!("Token has {} segments, expected 3", segments.len());
        return None;
    }

    let normalized = segments[1].replace('-', "+").replace('_', "/");
    let bytes = match PAYLOAD_ENGINE.decode(normalized) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Token payload is not base64: {}", e);
            return None;
        }
    };

    match serde_json::from_slice::<TokenPayload>(&bytes) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!("Token payload is not a JSON object: {}", e);
            None
        }
    }
}

fn exp_to_datetime(exp: f64) -> Option<DateTime<Utc>> {
    let millis = exp * 1000.0;
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis.floor() as i64).single()
}

/// `42s`, `5m 3s` or `2h 0m 9s` depending on magnitude
pub fn format_time_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours == 0 && minutes == 0 {
        format!("{}s", seconds)
    } else if hours == 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}h {}m {}s", hours, minutes, seconds)
    }
}
