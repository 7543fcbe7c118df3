//! In-memory transport for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use super::{ApiClient, ApiError};

pub(crate) const BASE_URL: &str = "http://api.test";
pub(crate) const STORAGE_URL: &str = "http://cdn.test/storage";

#[derive(Debug, Clone)]
enum Reply {
    Respond(u16, String),
    Fail,
}

/// Canned responses keyed by method and path, with a request log
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
}

fn route_key(method: Method, url: &str) -> String {
    format!("{} {}", method.as_str(), url)
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            route_key(method, &format!("{}{}", BASE_URL, path)),
            Reply::Respond(status, body.to_string()),
        );
    }

    pub fn fail(&self, method: Method, path: &str) {
        self.routes.lock().unwrap().insert(
            route_key(method, &format!("{}{}", BASE_URL, path)),
            Reply::Fail,
        );
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self, method: Method, path: &str) -> usize {
        let url = format!("{}{}", BASE_URL, path);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.method == method && request.url == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let key = route_key(request.method, &request.url);
        self.requests.lock().unwrap().push(request);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.routes.lock().unwrap().get(&key).cloned();
        match reply {
            Some(Reply::Respond(status, body)) => Ok(HttpResponse { status, body }),
            Some(Reply::Fail) => Err(ApiError::Transport("connection refused".to_string())),
            None => Ok(HttpResponse {
                status: 404,
                body: r#"{"message":"Not Found"}"#.to_string(),
            }),
        }
    }
}

pub(crate) fn mock_client(transport: &Arc<MockTransport>) -> ApiClient {
    ApiClient::with_transport(BASE_URL, STORAGE_URL, transport.clone())
}
