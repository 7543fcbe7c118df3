//! Caching, deduplicating API client
//!
//! Every outbound call goes through [`ApiClient::request`]. GET requests made
//! with `use_cache` are served from a 5 minute in-memory cache when possible,
//! and concurrent identical requests share a single network call.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::debug;

use super::memory::{TtlCache, DEFAULT_TTL};
use super::transport::{HttpRequest, HttpTransport, Method, ReqwestTransport};
use super::ApiError;

/// A network call that several callers may be waiting on
type PendingRequest = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Options for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Option<Value>) -> Self {
        Self {
            method: Method::Post,
            body,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Builds the cache key for a request: `"{METHOD}:{endpoint}"`
pub fn cache_key(method: Method, endpoint: &str) -> String {
    format!("{}:{}", method.as_str(), endpoint)
}

/// Client for the news REST API
///
/// Cheap to clone: clones share the same TTL cache and in-flight map, so one
/// instance built at startup serves the whole process.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    storage_base_url: String,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<Mutex<TtlCache<Value>>>,
    pending: Arc<Mutex<HashMap<String, PendingRequest>>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("storage_base_url", &self.storage_base_url)
            .field("transport", &self.transport)
            .field("cached", &lock(&self.cache).len())
            .field("in_flight", &lock(&self.pending).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ApiClient {
    /// Create a client that talks to the network with `reqwest`
    pub fn new(base_url: impl Into<String>, storage_base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, storage_base_url, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client with a custom transport
    pub fn with_transport(
        base_url: impl Into<String>,
        storage_base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            storage_base_url: storage_base_url.into(),
            transport,
            cache: Arc::new(Mutex::new(TtlCache::new(DEFAULT_TTL))),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the cache TTL. Drops anything already cached.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(Mutex::new(TtlCache::new(ttl)));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL used to resolve relative media paths
    pub fn storage_base_url(&self) -> &str {
        &self.storage_base_url
    }

    /// Issues a request, optionally through the cache
    ///
    /// Caching applies only when `use_cache` is set and the method is GET.
    /// A cacheable call returns a live cached body without touching the
    /// network, joins an identical in-flight request if there is one, and
    /// otherwise starts a new network call.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
        use_cache: bool,
    ) -> Result<Value, ApiError> {
        if !use_cache || options.method != Method::Get {
            return self.send(endpoint, options).await;
        }

        let key = cache_key(options.method, endpoint);
        let shared = {
            let mut pending = lock(&self.pending);
            if let Some(data) = lock(&self.cache).get(&key) {
                debug!(key = %key, "cache hit");
                return Ok(data);
            }
            match pending.get(&key) {
                Some(in_flight) => {
                    debug!(key = %key, "joining in-flight request");
                    in_flight.clone()
                }
                None => {
                    let request = self
                        .fetch_and_store(key.clone(), endpoint.to_string(), options)
                        .boxed()
                        .shared();
                    pending.insert(key, request.clone());
                    request
                }
            }
        };

        shared.await
    }

    /// Convenience wrapper for a GET request
    pub async fn get(&self, endpoint: &str, use_cache: bool) -> Result<Value, ApiError> {
        self.request(endpoint, RequestOptions::get(), use_cache).await
    }

    /// Empties the TTL cache, or only keys containing `pattern`
    ///
    /// Call with the resource name (e.g. `"articles"`) after a successful
    /// write so later reads go back to the network.
    pub fn clear_cache(&self, pattern: Option<&str>) -> usize {
        let removed = lock(&self.cache).clear(pattern);
        debug!(pattern = ?pattern, removed, "cleared request cache");
        removed
    }

    /// Number of requests currently in flight through the cache
    pub fn in_flight(&self) -> usize {
        lock(&self.pending).len()
    }

    /// The network half of a cacheable call
    ///
    /// Stores a successful body in the TTL cache, then clears the in-flight
    /// marker, before the result reaches any waiter.
    fn fetch_and_store(
        &self,
        key: String,
        endpoint: String,
        options: RequestOptions,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send + 'static {
        let client = self.clone();
        async move {
            let result = client.send(&endpoint, options).await;
            if let Ok(data) = &result {
                lock(&client.cache).insert(key.clone(), data.clone());
            }
            lock(&client.pending).remove(&key);
            result
        }
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let request = HttpRequest {
            method: options.method,
            url: self.url_for(endpoint),
            body: options.body,
            headers: options.headers,
        };

        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}
