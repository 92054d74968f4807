//! Bearer-token attachment and access-token refresh
//!
//! [`BearerTokenHook`] is the outgoing half: it reads the current access
//! token from the credential store before every send. [`TokenRefresher`] is
//! the recovery half: it exchanges the stored refresh token for a new access
//! token at the refresh endpoint.
//!
//! Refreshes are single-flight. Every caller that asks for a refresh while
//! one is outstanding awaits the same shared future and receives a clone of
//! its outcome; the slot is cleared once the outcome is observed, so the
//! next 401 after that starts a new refresh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::Method;
use tokenline_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use tokenline_domain::{RefreshRequest, RefreshResponse};
use tracing::{debug, error, info};

use super::errors::ApiError;
use super::pipeline::RequestHook;
use super::request::{ApiRequest, ApiResponse};
use crate::credentials::CredentialStore;
use crate::http::HttpClient;

/// Attaches `Authorization: Bearer <access_token>` when a token is stored
pub struct BearerTokenHook {
    store: Arc<dyn CredentialStore>,
}

impl BearerTokenHook {
    /// Hook reading the access token from `store`.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHook for BearerTokenHook {
    async fn before_send(&self, request: ApiRequest) -> Result<ApiRequest, ApiError> {
        match self.store.get(ACCESS_TOKEN_KEY)? {
            Some(token) => request.with_bearer(&token),
            None => {
                debug!(path = %request.path(), "No access token stored; sending unauthenticated");
                Ok(request)
            }
        }
    }
}

type SharedRefresh = Shared<BoxFuture<'static, Result<String, ApiError>>>;

/// Exchanges the refresh token for a new access token, one call at a time
pub struct TokenRefresher {
    http: HttpClient,
    store: Arc<dyn CredentialStore>,
    refresh_url: String,
    timeout: Duration,
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl TokenRefresher {
    /// # Arguments
    ///
    /// * `http` - Transport used for the refresh call (no request hooks)
    /// * `store` - Credential store holding both tokens
    /// * `refresh_url` - Absolute URL of the refresh endpoint
    /// * `timeout` - Upper bound for the whole refresh call
    pub fn new(
        http: HttpClient,
        store: Arc<dyn CredentialStore>,
        refresh_url: String,
        timeout: Duration,
    ) -> Self {
        Self { http, store, refresh_url, timeout, in_flight: Mutex::new(None) }
    }

    /// Absolute URL the refresh call is sent to.
    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    /// Whether a refresh is currently outstanding
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Obtain a fresh access token, joining an in-flight refresh if any.
    ///
    /// On success the new access token (and a rotated refresh token, if the
    /// server sent one) has already been persisted.
    ///
    /// # Errors
    /// Returns `ApiError::Refresh` wrapping the cause: missing refresh token,
    /// transport failure, non-2xx status, malformed payload, or store failure.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        self.refresh_rejected(None).await
    }

    /// Like [`TokenRefresher::refresh`], for a request the server rejected
    /// while carrying `rejected`.
    ///
    /// If the store already holds a different access token, a refresh
    /// finished after that request went out, and the stored token is
    /// returned without another refresh call.
    ///
    /// # Errors
    /// See [`TokenRefresher::refresh`].
    pub async fn refresh_rejected(&self, rejected: Option<&str>) -> Result<String, ApiError> {
        let refresh = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(existing) => {
                    debug!("Joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    if let Some(current) = self.superseding_token(rejected)? {
                        debug!("Access token already refreshed; reusing it");
                        return Ok(current);
                    }

                    let started = run_refresh(
                        self.http.clone(),
                        Arc::clone(&self.store),
                        self.refresh_url.clone(),
                        self.timeout,
                    )
                    .boxed()
                    .shared();
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let outcome = refresh.clone().await;

        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&refresh)) {
            *slot = None;
        }

        outcome
    }

    fn superseding_token(&self, rejected: Option<&str>) -> Result<Option<String>, ApiError> {
        let Some(rejected) = rejected else {
            return Ok(None);
        };

        match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(Some(current)) if current != rejected => Ok(Some(current)),
            Ok(_) => Ok(None),
            Err(e) => Err(ApiError::Refresh(Box::new(e.into()))),
        }
    }
}

async fn run_refresh(
    http: HttpClient,
    store: Arc<dyn CredentialStore>,
    refresh_url: String,
    timeout: Duration,
) -> Result<String, ApiError> {
    let outcome = match tokio::time::timeout(timeout, exchange(&http, store.as_ref(), &refresh_url))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(timeout)),
    };

    outcome.map_err(|cause| {
        error!(error = %cause, url = %refresh_url, "Refresh token failed");
        ApiError::Refresh(Box::new(cause))
    })
}

async fn exchange(
    http: &HttpClient,
    store: &dyn CredentialStore,
    refresh_url: &str,
) -> Result<String, ApiError> {
    let refresh_token = store.get(REFRESH_TOKEN_KEY)?.ok_or(ApiError::MissingRefreshToken)?;

    info!(url = %refresh_url, "Refreshing access token");

    let builder =
        http.request(Method::POST, refresh_url).json(&RefreshRequest { refresh_token });
    let response = ApiResponse::read(http.send(builder).await?).await?;

    if !response.status().is_success() {
        return Err(ApiError::Status {
            status: response.status(),
            url: refresh_url.to_string(),
            body: response.text(),
        });
    }

    let payload: RefreshResponse = response.json()?;
    if payload.access_token.is_empty() {
        return Err(ApiError::Decode("refresh response carried an empty access_token".into()));
    }

    store.set(ACCESS_TOKEN_KEY, &payload.access_token)?;
    if let Some(rotated) = payload.refresh_token.as_deref() {
        store.set(REFRESH_TOKEN_KEY, rotated)?;
        debug!("Refresh token rotated");
    }

    info!("Access token refreshed");
    Ok(payload.access_token)
}
