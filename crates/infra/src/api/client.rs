//! API client with bearer authentication and refresh-once recovery
//!
//! Every request goes through the hook pipeline and the shared transport. A
//! 401 on the first attempt triggers one token refresh and one retry; a 401
//! on the retry, any other error status, and transport failures are handed
//! back to the caller as they are.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokenline_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use tokenline_domain::{ApiConfig, CredentialPair};
use tracing::{debug, info, instrument, warn};

use super::auth::{BearerTokenHook, TokenRefresher};
use super::errors::ApiError;
use super::pipeline::{JsonHeadersHook, Pipeline, RequestHook, ResponseHook, TracingHook};
use super::request::{ApiRequest, ApiResponse, Attempt};
use crate::credentials::CredentialStore;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for API (e.g., "https://api.example.com")
    pub base_url: String,
    /// Refresh endpoint path, relative to `base_url`
    pub refresh_path: String,
    /// Timeout for each HTTP call (the refresh call included)
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            refresh_path: config.refresh_path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl ApiClientConfig {
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// API client with bearer authentication and token refresh
pub struct ApiClient {
    http: HttpClient,
    store: Arc<dyn CredentialStore>,
    pipeline: Pipeline,
    refresher: Arc<TokenRefresher>,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client with the default pipeline
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `store` - Credential store holding the access/refresh tokens
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the transport cannot be
    /// created
    pub fn new(
        config: ApiClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        Self::builder().config(config).store(store).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Credential store shared with the refresher.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Refresher used on 401 responses.
    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    /// Execute a request, refreshing the access token once on a 401
    ///
    /// # Errors
    ///
    /// - the retry's error if the refreshed token is rejected again
    /// - `ApiError::Refresh` if the refresh itself fails
    /// - any other error status or transport failure unchanged
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.execute_attempt(request, Attempt::Initial).await
    }

    /// Execute a request starting from a given attempt
    ///
    /// With `Attempt::Retried` a 401 is returned without refreshing.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn execute_attempt(
        &self,
        request: ApiRequest,
        attempt: Attempt,
    ) -> Result<ApiResponse, ApiError> {
        let mut attempt = attempt;
        let mut current = request;

        loop {
            let prepared = self.pipeline.prepare(current.clone()).await?;
            let sent_token = prepared.bearer_token().map(str::to_owned);

            match self.dispatch(prepared).await {
                Err(err) if err.is_unauthorized() && attempt.can_refresh() => {
                    warn!(path = %current.path(), "Access token rejected; refreshing");
                    let token = self.refresher.refresh_rejected(sent_token.as_deref()).await?;
                    current = current.with_bearer(&token)?;
                    attempt = attempt.next();
                }
                outcome => return outcome,
            }
        }
    }

    /// Execute a GET request and deserialize the JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(ApiRequest::get(path)).await?;
        let result = response.json()?;
        info!(path = %path, "GET request successful");
        Ok(result)
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let response = self.execute(ApiRequest::post(path).json(body)?).await?;
        let result = response.json()?;
        info!(path = %path, "POST request successful");
        Ok(result)
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let response = self.execute(ApiRequest::put(path).json(body)?).await?;
        let result = response.json()?;
        info!(path = %path, "PUT request successful");
        Ok(result)
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.execute(ApiRequest::delete(path)).await?;
        let result = response.json()?;
        info!(path = %path, "DELETE request successful");
        Ok(result)
    }

    /// Store a freshly issued credential pair
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Store` if either write fails
    pub fn login(&self, credentials: &CredentialPair) -> Result<(), ApiError> {
        self.store.set(ACCESS_TOKEN_KEY, &credentials.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &credentials.refresh_token)?;
        info!("Credentials stored");
        Ok(())
    }

    /// Forget both tokens
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Store` if either delete fails
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        info!("Credentials cleared");
        Ok(())
    }

    /// Whether an access token is currently stored
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Store` if the store cannot be read
    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.is_some())
    }

    /// Send an already prepared request once and run the response hooks
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.config.url_for(request.path());

        debug!(method = %request.method(), url = %url, "Dispatching request");

        let mut builder =
            self.http.request(request.method().clone(), &url).headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let timeout = self.config.timeout;
        let response = match tokio::time::timeout(timeout, self.http.send(builder)).await {
            Ok(Ok(resp)) => ApiResponse::read(resp).await?,
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(ApiError::Timeout(timeout)),
        };

        let response = self.pipeline.observe(&request, response).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, url, body: response.text() });
        }

        Ok(response)
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    request_hooks: Vec<Arc<dyn RequestHook>>,
    response_hooks: Vec<Arc<dyn ResponseHook>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Append a request hook; it runs after the built-in ones
    pub fn request_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.request_hooks.push(hook);
        self
    }

    /// Append a response hook; it runs after the built-in ones
    pub fn response_hook(mut self, hook: Arc<dyn ResponseHook>) -> Self {
        self.response_hooks.push(hook);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the store is missing, the base URL does not parse,
    /// or the transport cannot be created
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let store =
            self.store.ok_or_else(|| ApiError::Config("Credential store not set".to_string()))?;

        url::Url::parse(&config.base_url).map_err(|e| {
            ApiError::Config(format!("Invalid base URL {:?}: {}", config.base_url, e))
        })?;

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tokenline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {}", e)))?;

        let mut pipeline = Pipeline::new();
        pipeline.push_request_hook(Arc::new(JsonHeadersHook));
        pipeline.push_request_hook(Arc::new(BearerTokenHook::new(Arc::clone(&store))));
        for hook in self.request_hooks {
            pipeline.push_request_hook(hook);
        }
        pipeline.push_response_hook(Arc::new(TracingHook));
        for hook in self.response_hooks {
            pipeline.push_response_hook(hook);
        }

        let refresher = Arc::new(TokenRefresher::new(
            http.clone(),
            Arc::clone(&store),
            config.url_for(&config.refresh_path),
            config.timeout,
        ));

        Ok(ApiClient { http, store, pipeline, refresher, config })
    }
}
