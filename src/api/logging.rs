//! Structured logging with correlation tracking for Web API exchanges
//!
//! Each exchange gets a correlation id so the request, response and
//! completion lines of one call can be matched up in the log.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Logging configuration for the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log request and response lines, not just completions
    pub request_logging: bool,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            request_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

impl LoggingConfig {
    /// Completions and failures only
    pub fn quiet() -> Self {
        Self {
            request_logging: false,
            log_level: LogLevel::Warn,
        }
    }
}

/// Structured logger for API exchanges
#[derive(Debug, Clone, Default)]
pub struct ApiLogger {
    config: LoggingConfig,
}

/// Context for a single exchange
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Unique correlation ID for this exchange
    pub correlation_id: String,
    /// Operation type (retrieve, create, delete, ...)
    pub operation_type: String,
    /// URL the request targets
    pub target: String,
    pub start_time: Instant,
}

impl ApiLogger {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Start tracking a new exchange
    pub fn start_operation(&self, operation_type: &str, target: &str) -> OperationContext {
        OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            operation_type: operation_type.to_string(),
            target: target.to_string(),
            start_time: Instant::now(),
        }
    }

    /// Log HTTP request details
    pub fn log_request(&self, context: &OperationContext, method: &str, headers: &[(String, String)]) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "method": method,
            "url": context.target,
            "headers": sanitize_headers(headers),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Request: {}", log_data);
    }

    /// Log HTTP response details
    pub fn log_response(&self, context: &OperationContext, status_code: u16, duration: Duration) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "status_code": status_code,
            "duration_ms": duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Response: {}", log_data);
    }

    /// Log a response that failed the operation's success predicate
    pub fn log_failure(&self, context: &OperationContext, status_code: u16, message: &str) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let log_data = json!({
            "event": "operation_failed",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "url": context.target,
            "status_code": status_code,
            "error_message": message,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        warn!("API Operation Failed: {}", log_data);
    }

    /// Log a successful completion
    pub fn complete_operation(&self, context: &OperationContext, status_code: u16) {
        if !self.should_log(LogLevel::Info) {
            return;
        }

        let log_data = json!({
            "event": "operation_completed",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "status_code": status_code,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        info!("API Operation Completed: {}", log_data);
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level_rank(level) <= level_rank(self.config.log_level)
    }
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn level_rank(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 0,
        LogLevel::Warn => 1,
        LogLevel::Info => 2,
        LogLevel::Debug => 3,
        LogLevel::Trace => 4,
    }
}

/// Redact credentials before headers reach the log
fn sanitize_headers(headers: &[(String, String)]) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(key, value)| {
            let key_lower = key.to_lowercase();
            if key_lower.contains("authorization") || key_lower.contains("token") || key_lower.contains("key") {
                (key.clone(), "[REDACTED]".to_string())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}
