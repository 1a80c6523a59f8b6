//! Bearer token claims. The console treats the token as opaque apart from
//! reading its JWT payload segment; signatures are the backend's business.

use affiliate_core::{ConsoleError, ConsoleResult, EntityId};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// Decode the payload segment of a `header.payload.signature` token.
    pub fn decode(token: &str) -> ConsoleResult<Claims> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(ConsoleError::Session("token is not a JWT".to_string())),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ConsoleError::Session(format!("token payload is not base64url: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ConsoleError::Session(format!("token claims are malformed: {e}")))
    }

    /// Build an unsigned (`alg: none`) token carrying these claims.
    pub fn encode_unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(self).unwrap_or_default());
        format!("{header}.{payload}.")
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(true, |exp| exp <= now)
    }
}
