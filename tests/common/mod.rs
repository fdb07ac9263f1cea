//! Shared test helpers: an in-memory transport and a client wired to it
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use xrm_webapi::api::{
    HttpRequest, HttpResponse, StaticContext, Transport, WebApiClient, WebApiResult,
};

pub const ORG_URL: &str = "https://org.crm.dynamics.com";
pub const SERVICE_URL: &str = "https://org.crm.dynamics.com/api/data/v8.2/";
pub const GUID: &str = "11111111-1111-1111-1111-111111111111";

/// Transport that records requests and replays queued responses in order
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> WebApiResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| {
            HttpResponse::new(500)
                .with_status_text("Internal Server Error")
                .with_body("no response queued")
        }))
    }
}

pub fn client(transport: &MockTransport) -> WebApiClient {
    WebApiClient::new(StaticContext::new(ORG_URL), transport.clone())
}

pub fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(status).with_body(body.to_string())
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
