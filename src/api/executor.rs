//! Request executor
//!
//! Turns a [`RequestDescriptor`] into exactly one HTTP exchange and reports
//! either the parsed result or a decoded failure.

use super::constants::{headers, status};
use super::error::{ODataError, WebApiError, WebApiResult, decode_error_message};
use super::logging::ApiLogger;
use super::request::{HttpRequest, HttpResponse, RequestDescriptor};
use super::transport::Transport;
use serde_json::Value;
use std::sync::Arc;

/// Called with the status and raw status text of every failed exchange
pub type FailureHook = Arc<dyn Fn(u16, &str) + Send + Sync>;

/// A completed exchange that passed its success predicate
#[derive(Debug, Clone)]
pub struct Exchange {
    pub response: HttpResponse,
    /// Parsed body, when the descriptor asked for it and one was sent
    pub body: Option<Value>,
}

#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    logger: ApiLogger,
    failure_hook: Option<FailureHook>,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            logger: ApiLogger::default(),
            failure_hook: None,
        }
    }

    pub fn with_logger(mut self, logger: ApiLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.failure_hook = Some(hook);
        self
    }

    /// The four headers every request carries, in wire order
    pub fn standard_headers() -> Vec<(String, String)> {
        vec![
            (headers::ODATA_MAX_VERSION.to_string(), headers::ODATA_VERSION_VALUE.to_string()),
            (headers::ODATA_VERSION.to_string(), headers::ODATA_VERSION_VALUE.to_string()),
            (headers::ACCEPT.to_string(), headers::ACCEPT_JSON.to_string()),
            (headers::CONTENT_TYPE.to_string(), headers::CONTENT_TYPE_JSON.to_string()),
        ]
    }

    /// Build the transport request: encoded URL, layered headers, JSON body
    pub fn build_request(descriptor: &RequestDescriptor) -> WebApiResult<HttpRequest> {
        let url = reqwest::Url::parse(&descriptor.url).map_err(|e| WebApiError::InvalidUrl {
            url: descriptor.url.clone(),
            reason: e.to_string(),
        })?;

        let mut request_headers = Self::standard_headers();
        for (name, value) in &descriptor.headers {
            match request_headers
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            {
                Some(slot) => slot.1 = value.clone(),
                None => request_headers.push((name.clone(), value.clone())),
            }
        }

        let body = match &descriptor.payload {
            Some(payload) => serde_json::to_string(payload).map_err(WebApiError::Serialize)?,
            None => String::new(),
        };

        Ok(HttpRequest {
            method: descriptor.method.clone(),
            url,
            headers: request_headers,
            body,
        })
    }

    /// Perform the exchange described by `descriptor`
    pub async fn execute(&self, operation_type: &str, descriptor: &RequestDescriptor) -> WebApiResult<Exchange> {
        let request = Self::build_request(descriptor)?;
        let context = self.logger.start_operation(operation_type, request.url.as_str());
        self.logger.log_request(&context, request.method.as_str(), &request.headers);

        let response = self.transport.send(request).await?;
        self.logger.log_response(&context, response.status, context.elapsed());

        if !descriptor.success.accepts(response.status) {
            let failure = self.failure(response);
            if let WebApiError::HttpFailure { status, message, .. } = &failure {
                self.logger.log_failure(&context, *status, message);
            }
            return Err(failure);
        }

        let body = if descriptor.parse_body && has_body(&response) {
            Some(serde_json::from_str(&response.body).map_err(WebApiError::BodyParse)?)
        } else {
            None
        };

        self.logger.complete_operation(&context, response.status);
        Ok(Exchange { response, body })
    }

    fn failure(&self, response: HttpResponse) -> WebApiError {
        let status_text = response.status_text.as_deref();
        if let Some(hook) = &self.failure_hook {
            hook(response.status, status_text.unwrap_or_default());
        }

        let body = Some(response.body.as_str()).filter(|body| !body.trim().is_empty());
        WebApiError::HttpFailure {
            status: response.status,
            message: decode_error_message(body, status_text),
            error: body.and_then(ODataError::from_body),
        }
    }
}

fn has_body(response: &HttpResponse) -> bool {
    response.status != status::NO_CONTENT
        && response.status != status::LEGACY_NO_CONTENT
        && !response.body.trim().is_empty()
}
