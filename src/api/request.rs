//! Request descriptors and transport-level request/response types

use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;

use super::constants::status;

/// Whether a dispatched operation returns before or after its exchange completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Return immediately; callbacks run when the exchange completes
    #[default]
    Async,
    /// Drive the exchange to completion before returning
    Blocking,
}

impl ExecutionMode {
    /// Map the legacy boolean `async` flag
    pub fn from_async_flag(is_async: bool) -> Self {
        if is_async { Self::Async } else { Self::Blocking }
    }
}

/// Set of status codes an operation accepts as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessPredicate(&'static [u16]);

impl SuccessPredicate {
    pub const OK: Self = Self(&[status::OK]);
    pub const CREATED: Self = Self(&[status::CREATED]);
    pub const NO_CONTENT: Self = Self(&[status::NO_CONTENT]);
    pub const NO_CONTENT_OR_LEGACY: Self = Self(&[status::NO_CONTENT, status::LEGACY_NO_CONTENT]);
    pub const OK_OR_NO_CONTENT: Self = Self(&[status::OK, status::NO_CONTENT]);

    pub const fn new(statuses: &'static [u16]) -> Self {
        Self(statuses)
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.0.contains(&status)
    }

    pub fn statuses(&self) -> &'static [u16] {
        self.0
    }
}

impl Default for SuccessPredicate {
    fn default() -> Self {
        Self::OK
    }
}

/// Everything needed to perform one exchange
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub mode: ExecutionMode,
    /// Operation-specific headers, layered over the standard OData headers
    pub headers: Vec<(String, String)>,
    pub payload: Option<Value>,
    pub success: SuccessPredicate,
    pub parse_body: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            mode: ExecutionMode::default(),
            headers: Vec::new(),
            payload: None,
            success: SuccessPredicate::default(),
            parse_body: false,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn payload(mut self, payload: Option<Value>) -> Self {
        self.payload = payload;
        self
    }

    pub fn success(mut self, predicate: SuccessPredicate) -> Self {
        self.success = predicate;
        self
    }

    pub fn parse_body(mut self, parse: bool) -> Self {
        self.parse_body = parse;
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Request as handed to a transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: reqwest::Url,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// First header with the given name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Completed exchange as reported by a transport
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: Option<String>,
    /// Header names are stored lower-cased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
