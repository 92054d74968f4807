//! Ordered request/response hooks
//!
//! Request hooks run in registration order before every send (including the
//! retry after a token refresh). Response hooks run in registration order on
//! every response that came back from the server, whatever its status,
//! before the client classifies it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::debug;

use super::errors::ApiError;
use super::request::{ApiRequest, ApiResponse};

/// Hook invoked before a request is sent
#[async_trait]
pub trait RequestHook: Send + Sync {
    /// Return the request to send. An error aborts the call before any
    /// network I/O.
    async fn before_send(&self, request: ApiRequest) -> Result<ApiRequest, ApiError>;
}

/// Hook invoked after a response is received
#[async_trait]
pub trait ResponseHook: Send + Sync {
    /// Return the response to hand on. An error replaces the response as the
    /// outcome of the call.
    async fn after_receive(
        &self,
        request: &ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, ApiError>;
}

/// Ordered list of hooks
#[derive(Clone, Default)]
pub struct Pipeline {
    request_hooks: Vec<Arc<dyn RequestHook>>,
    response_hooks: Vec<Arc<dyn ResponseHook>>,
}

impl Pipeline {
    /// Pipeline with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook that runs before every send.
    pub fn push_request_hook(&mut self, hook: Arc<dyn RequestHook>) {
        self.request_hooks.push(hook);
    }

    /// Append a hook that runs on every received response.
    pub fn push_response_hook(&mut self, hook: Arc<dyn ResponseHook>) {
        self.response_hooks.push(hook);
    }

    /// Number of request hooks.
    pub fn request_hook_count(&self) -> usize {
        self.request_hooks.len()
    }

    /// Number of response hooks.
    pub fn response_hook_count(&self) -> usize {
        self.response_hooks.len()
    }

    /// Run every request hook in order.
    ///
    /// # Errors
    /// Returns the first hook error.
    pub async fn prepare(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiError> {
        for hook in &self.request_hooks {
            request = hook.before_send(request).await?;
        }
        Ok(request)
    }

    /// Run every response hook in order.
    ///
    /// # Errors
    /// Returns the first hook error.
    pub async fn observe(
        &self,
        request: &ApiRequest,
        mut response: ApiResponse,
    ) -> Result<ApiResponse, ApiError> {
        for hook in &self.response_hooks {
            response = hook.after_receive(request, response).await?;
        }
        Ok(response)
    }
}

/// Adds `Content-Type` and `Accept: application/json` unless already set
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonHeadersHook;

#[async_trait]
impl RequestHook for JsonHeadersHook {
    async fn before_send(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiError> {
        let json = HeaderValue::from_static("application/json");

        if !request.headers().contains_key(CONTENT_TYPE) {
            request = request.header(CONTENT_TYPE, json.clone());
        }
        if !request.headers().contains_key(ACCEPT) {
            request = request.header(ACCEPT, json);
        }

        Ok(request)
    }
}

/// Logs every received response at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHook;

#[async_trait]
impl ResponseHook for TracingHook {
    async fn after_receive(
        &self,
        request: &ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, ApiError> {
        debug!(
            method = %request.method(),
            path = %request.path(),
            status = %response.status(),
            bytes = response.body().len(),
            "API response received"
        );
        Ok(response)
    }
}
