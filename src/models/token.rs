//! Bearer token payload and derived metadata

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loosely typed claim; the payload shape is not controlled by this client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl ClaimValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ClaimValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Decoded (unverified) token payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPayload(pub BTreeMap<String, ClaimValue>);

impl TokenPayload {
    pub fn get(&self, claim: &str) -> Option<&ClaimValue> {
        self.0.get(claim)
    }

    /// `exp` claim in seconds since the epoch, when numeric
    pub fn exp(&self) -> Option<f64> {
        self.get("exp").and_then(ClaimValue::as_f64)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(ClaimValue::as_str)
    }
}

/// Token metadata computed at read time; informational only, never an
/// authorization decision since the signature is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub token: String,
    pub payload: TokenPayload,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub time_remaining: String,
}
