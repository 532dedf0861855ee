//! Cache-aware courier over a pluggable transport.

use super::builder::CourierBuilder;
use super::Courier;
use crate::cache::ResponseCache;
use crate::error::{CourierError, Result};
use crate::models::{Headers, Method, RequestData, Response};
use crate::network::{RawResponse, ResponseParser, Transport, TransportError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Courier composed of a transport, a response parser and an optional cache.
pub struct HttpCourier {
    transport: Arc<dyn Transport>,
    parser: Arc<dyn ResponseParser>,
    cache: Option<Arc<dyn ResponseCache>>,
    /// Process-wide switch for this instance; the cache itself stays untouched.
    cache_enabled: AtomicBool,
}

impl HttpCourier {
    pub fn new(
        transport: Arc<dyn Transport>,
        parser: Arc<dyn ResponseParser>,
        cache: Option<Arc<dyn ResponseCache>>,
        cache_enabled: bool,
    ) -> Self {
        Self {
            transport,
            parser,
            cache,
            cache_enabled: AtomicBool::new(cache_enabled),
        }
    }

    /// Start configuring a courier.
    pub fn builder() -> CourierBuilder {
        CourierBuilder::new()
    }

    /// Whether a cache backend is attached, regardless of the enabled flag.
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// The cache to use for a request, if caching is both configured and enabled.
    fn active_cache(&self, method: Method) -> Option<&dyn ResponseCache> {
        if !method.is_cache_eligible() || !self.cache_enabled.load(Ordering::SeqCst) {
            return None;
        }
        self.cache.as_deref()
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        cache_minutes: u32,
    ) -> Result<Response> {
        if let Some(cache) = self.active_cache(method) {
            if let Some(response) = cache.find_response(method, url, data, headers)? {
                debug!("Cache hit for {} {}", method, url);
                return Ok(response);
            }
            debug!("Cache miss for {} {}", method, url);
        }

        let raw = self
            .dispatch(method, url, data, headers)
            .await
            .map_err(|e| {
                warn!("{} {} failed in transport: {}", method, url, e);
                CourierError::from(e)
            })?;

        let response = check_status(self.parser.parse(raw))?;

        if cache_minutes > 0 {
            if let Some(cache) = self.active_cache(method) {
                cache
                    .store_response(&response, method, url, data, headers, cache_minutes)
                    .map_err(|e| {
                        warn!("Failed to cache {} {}: {}", method, url, e);
                        e
                    })?;
                debug!("Cached {} {} for {} minutes", method, url, cache_minutes);
            }
        }

        Ok(response)
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        data: &RequestData,
        headers: &Headers,
    ) -> std::result::Result<RawResponse, TransportError> {
        match method {
            Method::Get => self.transport.get(url, data, headers).await,
            Method::Post => self.transport.post(url, data, headers).await,
            Method::Put => self.transport.put(url, data, headers).await,
            Method::Patch => self.transport.patch(url, data, headers).await,
            Method::Delete => self.transport.delete(url, data, headers).await,
        }
    }
}

/// Fail on any status of 400 or above, keeping the response for the caller.
fn check_status(response: Response) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }

    warn!(
        "Request returned HTTP {} {}",
        response.http_code(),
        response.http_message()
    );
    Err(CourierError::http_status(response))
}

#[async_trait]
impl Courier for HttpCourier {
    async fn get(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        cache_minutes: u32,
    ) -> Result<Response> {
        self.send(Method::Get, url, data, headers, cache_minutes).await
    }

    async fn post(
        &self,
        url: &str,
        data: &RequestData,
        headers: &Headers,
        cache_minutes: u32,
    ) -> Result<Response> {
        self.send(Method::Post, url, data, headers, cache_minutes).await
    }

    async fn put(&self, url: &str, data: &RequestData, headers: &Headers) -> Result<Response> {
        self.send(Method::Put, url, data, headers, 0).await
    }

    async fn patch(&self, url: &str, data: &RequestData, headers: &Headers) -> Result<Response> {
        self.send(Method::Patch, url, data, headers, 0).await
    }

    async fn delete(&self, url: &str, data: &RequestData, headers: &Headers) -> Result<Response> {
        self.send(Method::Delete, url, data, headers, 0).await
    }

    fn set_basic_authentication(&self, username: &str, password: &str) {
        self.transport.set_basic_authentication(username, password);
    }

    fn unset_basic_authentication(&self) {
        self.transport.unset_basic_authentication();
    }

    fn is_cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::SeqCst)
    }

    fn enable_cache(&self) {
        self.cache_enabled.store(true, Ordering::SeqCst);
        info!("Response caching enabled");
    }

    fn disable_cache(&self) {
        self.cache_enabled.store(false, Ordering::SeqCst);
        info!("Response caching disabled");
    }

    fn forget_cache(&self) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.forget()?;
            info!("Forgot cached responses");
        }
        Ok(())
    }
}
