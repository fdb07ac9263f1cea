//! Error types for Web API operations and OData error decoding

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when neither the body nor the status line explain a failure
pub const UNEXPECTED_ERROR: &str = "Unexpected Error";

/// Result type for Web API operations
pub type WebApiResult<T> = Result<T, WebApiError>;

/// Errors raised while resolving, sending or interpreting a Web API request
#[derive(Debug, Error)]
pub enum WebApiError {
    /// The host base URL could not be resolved
    #[error("{0}")]
    ContextUnavailable(String),

    /// The response status failed the operation's success predicate
    #[error("{message}")]
    HttpFailure {
        status: u16,
        message: String,
        error: Option<ODataError>,
    },

    /// A success response carried a body that is not valid JSON
    #[error("Failed to parse response body: {0}")]
    BodyParse(#[source] serde_json::Error),

    /// The request payload could not be serialized
    #[error("Failed to serialize request payload: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A create response did not say which record was created
    #[error("Response is missing a usable OData-EntityId header")]
    MissingEntityId,

    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WebApiError {
    /// HTTP status for failures that reached the server
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error object from an OData error envelope `{ "error": { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Deserialize)]
struct ODataErrorEnvelope {
    error: ODataError,
}

impl ODataError {
    /// Decode the error envelope from a response body, if it has one
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<ODataErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

/// Best-effort message for a failed exchange.
///
/// Prefers `error.message` from the body, then the HTTP status text, then
/// [`UNEXPECTED_ERROR`]. Never fails.
pub fn decode_error_message(body: Option<&str>, status_text: Option<&str>) -> String {
    if let Some(error) = body.and_then(ODataError::from_body) {
        return error.message;
    }

    match status_text.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNEXPECTED_ERROR.to_string(),
    }
}
