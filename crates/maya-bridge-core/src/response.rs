//! Result envelope and bridge response shapes
//!
//! Every call through the bridge yields exactly one [`BridgeResponse`]. Its JSON
//! form is what an automated caller sees:
//!
//! - success: `{"stdout": "...", "result": ...}`
//! - connection failure: `{"error": "..."}`
//! - unparseable payload: `{"error": "...", "raw": "..."}`

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

/// Output of one remote execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Everything the fragment printed, plus error text on failure
    #[serde(default)]
    pub stdout: String,
    /// Value the fragment assigned to the out-variable, null if never set
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ResultEnvelope {
    /// Envelope with text output and no result
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            result: serde_json::Value::Null,
        }
    }
}

/// Response handed back to the bridge caller
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    /// Validated payload exactly as the remote side emitted it
    Payload(Box<RawValue>),
    /// Reply carried no sentinel; the whole buffer is reported as output
    Fallback(ResultEnvelope),
    /// Connect, timeout or socket failure
    ConnectionError { error: String },
    /// Sentinel found but the payload did not decode
    ParseError { error: String, raw: String },
}

impl BridgeResponse {
    /// Validate `payload` as JSON and keep it verbatim
    pub fn from_payload(payload: &str) -> Result<Self, BridgeError> {
        RawValue::from_string(payload.to_owned())
            .map(BridgeResponse::Payload)
            .map_err(|e| BridgeError::ParseError(e.to_string()))
    }

    /// Best-effort response for a reply without a result envelope
    pub fn fallback(stdout: impl Into<String>) -> Self {
        BridgeResponse::Fallback(ResultEnvelope::from_stdout(stdout))
    }

    /// Parse failure that keeps the full reply for diagnosis
    pub fn parse_error(err: &BridgeError, raw: impl Into<String>) -> Self {
        BridgeResponse::ParseError {
            error: err.to_string(),
            raw: raw.into(),
        }
    }

    /// Decoded result envelope, if this response carries one
    pub fn envelope(&self) -> Option<ResultEnvelope> {
        match self {
            BridgeResponse::Payload(raw) => serde_json::from_str(raw.get()).ok(),
            BridgeResponse::Fallback(envelope) => Some(envelope.clone()),
            _ => None,
        }
    }

    /// Error message for the error shapes
    pub fn error(&self) -> Option<&str> {
        match self {
            BridgeResponse::ConnectionError { error } | BridgeResponse::ParseError { error, .. } => {
                Some(error)
            }
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Response as a JSON value
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            BridgeResponse::Payload(raw) => serde_json::from_str(raw.get())
                .unwrap_or_else(|_| serde_json::Value::String(raw.get().to_owned())),
            BridgeResponse::Fallback(envelope) => serde_json::json!({
                "stdout": envelope.stdout,
                "result": envelope.result,
            }),
            BridgeResponse::ConnectionError { error } => serde_json::json!({ "error": error }),
            BridgeResponse::ParseError { error, raw } => {
                serde_json::json!({ "error": error, "raw": raw })
            }
        }
    }
}

impl From<BridgeError> for BridgeResponse {
    fn from(err: BridgeError) -> Self {
        BridgeResponse::ConnectionError {
            error: err.to_string(),
        }
    }
}

/// Wire JSON text; payloads are written back untouched
impl fmt::Display for BridgeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
