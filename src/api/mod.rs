//! Client for The Bold East Africa REST API
//!
//! The [`ApiClient`] is the single chokepoint for outbound calls. It adds an
//! opt-in 5 minute cache for GET requests and collapses concurrent identical
//! requests into one network call. Resource methods (articles, categories,
//! campaigns) unwrap the `{ data, message, status }` envelope and normalize
//! records into the types in [`crate::data`].

mod client;
mod error;
pub mod memory;
mod resources;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{cache_key, ApiClient, RequestOptions};
pub use error::ApiError;
pub use resources::{unwrap_envelope, ARTICLES, CAMPAIGNS, CATEGORIES};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
