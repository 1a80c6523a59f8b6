//! The one response schema every endpoint returns:
//! `{ "success": bool, "message"?: string, "data"?: T }`.
//!
//! Parsing happens here, once, and fails fast on any mismatch.

use affiliate_core::{ConsoleError, ConsoleResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Classify a raw HTTP response and return its `data` payload.
pub fn parse_envelope(status: u16, body: &str) -> ConsoleResult<Option<Value>> {
    if status == 401 {
        return Err(ConsoleError::Unauthorized);
    }

    let parsed = serde_json::from_str::<ApiEnvelope>(body);

    if !(200..300).contains(&status) {
        let message = parsed.ok().and_then(|e| e.message);
        return Err(ConsoleError::Http { status, message });
    }

    if status == 204 && body.trim().is_empty() {
        return Ok(None);
    }

    let envelope = parsed.map_err(|e| {
        ConsoleError::UnexpectedResponse(format!("response is not a JSON envelope: {e}"))
    })?;

    if envelope.success != Some(true) {
        return Err(ConsoleError::Rejected {
            message: envelope.message,
        });
    }

    Ok(envelope.data.filter(|d| !d.is_null()))
}

/// Decode a required `data` payload into `T`.
pub fn decode_data<T: DeserializeOwned>(data: Option<Value>) -> ConsoleResult<T> {
    let data = data.ok_or_else(|| {
        ConsoleError::UnexpectedResponse("envelope has no data field".to_string())
    })?;
    serde_json::from_value(data).map_err(|e| ConsoleError::UnexpectedResponse(e.to_string()))
}
