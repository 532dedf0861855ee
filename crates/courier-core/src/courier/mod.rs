//! The request-execution capability exposed to callers.
//!
//! [`Courier`] is the public surface; [`HttpCourier`] is the orchestrator that
//! runs every verb through one pipeline:
//!
//! 1. cache lookup (GET/POST, when a cache is configured and enabled)
//! 2. transport dispatch
//! 3. parsing into a [`Response`]
//! 4. status classification (`>= 400` fails with the response attached)
//! 5. cache store (success only, positive duration only)

mod builder;
mod http;

pub use builder::CourierBuilder;
pub use http::HttpCourier;

use crate::error::Result;
use crate::models::{Headers, RequestData, Response};
use async_trait::async_trait;

/// Issues HTTP requests with optional response caching and basic authentication.
///
/// Only GET and POST take a cache duration; PUT, PATCH and DELETE always reach
/// the transport and never touch the cache. A duration of `0` minutes means the
/// response is not stored.
#[async_trait]
pub trait Courier: Send + Sync {
    /// Send a GET request, caching a successful response for `cache_minutes`.
    async fn get(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        cache_minutes: u32,
    ) -> Result<Response>;

    /// Send a POST request, caching a successful response for `cache_minutes`.
    async fn post(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        cache_minutes: u32,
    ) -> Result<Response>;

    async fn put(&self, url: &str, data: &RequestData, headers: &Headers) -> Result<Response>;

    async fn patch(&self, url: &str, data: &RequestData, headers: &Headers) -> Result<Response>;

    async fn delete(&self, url: &str, data: &RequestData, headers: &Headers) -> Result<Response>;

    /// Send basic authentication with every later request.
    fn set_basic_authentication(&self, username: &str, password: &str);

    fn unset_basic_authentication(&self);

    fn is_cache_enabled(&self) -> bool;

    fn enable_cache(&self);

    fn disable_cache(&self);

    /// Drop every cached response. Does nothing without a cache.
    fn forget_cache(&self) -> Result<()>;
}
