//! Authenticated API client
//!
//! This module provides the HTTP client used to talk to the remote API. It
//! attaches the stored bearer token to every request and recovers from an
//! expired access token by refreshing it once and retrying the request once.
//!
//! # Architecture
//!
//! - [`ApiRequest`] / [`ApiResponse`]: immutable request descriptor and
//!   buffered response
//! - [`Pipeline`]: ordered pre-send and post-receive hooks
//! - [`BearerTokenHook`]: attaches `Authorization: Bearer <access_token>`
//! - [`TokenRefresher`]: single-flight refresh against `POST /auth/refresh`
//! - [`ApiClient`]: ties the above to the shared [`HttpClient`] transport and
//!   runs the refresh-once state machine
//!
//! [`HttpClient`]: crate::http::HttpClient

pub mod auth;
pub mod client;
pub mod errors;
pub mod pipeline;
pub mod request;

pub use auth::{BearerTokenHook, TokenRefresher};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use pipeline::{JsonHeadersHook, Pipeline, RequestHook, ResponseHook, TracingHook};
pub use request::{ApiRequest, ApiResponse, Attempt};
