//! HTTP client for the IP set, ledger and metrics endpoints.

use crate::api::*;
use crate::config::RateLimitConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use wafguard_core::{GuardError, Result};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the firewall management API
#[derive(Clone)]
pub struct WafClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Url,
    usage_url: Option<Url>,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl WafClient {
    /// Create a client for the given API base URL using default settings
    pub fn new(base_url: &str) -> Result<Self> {
        WafClientBuilder::new(base_url).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> WafClientBuilder {
        WafClientBuilder::new(base_url)
    }

    /// Access IP set endpoints
    #[must_use]
    pub fn ip_sets(&self) -> IpSetApi<'_> {
        IpSetApi::new(self)
    }

    /// Access retention ledger endpoints
    #[must_use]
    pub fn ledger(&self, table: impl Into<String>) -> LedgerApi<'_> {
        LedgerApi::new(self, table.into())
    }

    /// Access request metric and usage report endpoints
    #[must_use]
    pub fn metrics(&self) -> MetricsApi<'_> {
        MetricsApi::new(self)
    }

    /// Usage report endpoint, if one was configured
    pub(crate) fn usage_url(&self) -> Option<&Url> {
        self.inner.usage_url.as_ref()
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.build_url(segments, params)?;
        debug!(url = %url, "GET request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GuardError::Upstream(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Perform a PUT request with JSON body
    pub(crate) async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(segments, &[])?;
        debug!(url = %url, "PUT request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GuardError::Upstream(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Perform a PUT request with JSON body, ignoring the response body
    pub(crate) async fn put_empty<B: serde::Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<()> {
        let url = self.build_url(segments, &[])?;
        debug!(url = %url, "PUT request");
        self.inner.rate_limiter.until_ready().await;

        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GuardError::Upstream(e.to_string()))?;

        self.handle_empty_response(response).await
    }

    /// POST a JSON body to an absolute URL, ignoring the response body
    pub(crate) async fn post_to<B: serde::Serialize + Sync>(&self, url: &Url, body: &B) -> Result<()> {
        debug!(url = %url, "POST request");

        let response = self
            .inner
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| GuardError::Upstream(e.to_string()))?;

        self.handle_empty_response(response).await
    }

    /// Append percent-encoded path segments and query parameters to the base URL
    fn build_url(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| GuardError::Config(String::from("store URL cannot be a base")))?
            .pop_if_empty()
            .extend(segments);

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| GuardError::Upstream(e.to_string()))?;
            serde_json::from_str(&body).map_err(GuardError::Json)
        } else {
            self.handle_error(status.as_u16(), response).await
        }
    }

    /// Handle an API response that returns no body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            self.handle_error(status.as_u16(), response).await
        }
    }

    /// Convert an error response to a `GuardError`
    async fn handle_error<T>(&self, status: u16, response: reqwest::Response) -> Result<T> {
        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();

        // Try to parse error message from JSON
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("Message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or(body);

        match status {
            404 => Err(GuardError::NotFound { resource: path }),
            409 | 412 => Err(GuardError::TokenMismatch { set: path }),
            429 => {
                warn!("Rate limited by firewall API");
                Err(GuardError::RateLimited)
            }
            _ => Err(GuardError::Upstream(format!("HTTP {status}: {message}"))),
        }
    }
}

/// Builder for configuring a [`WafClient`]
pub struct WafClientBuilder {
    base_url: String,
    usage_url: Option<String>,
    timeout: Duration,
    user_agent: String,
    rate_limit: RateLimitConfig,
}

impl WafClientBuilder {
    /// Create a new builder for the given API base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            usage_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("wafguard/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Set the endpoint anonymized usage reports are posted to
    #[must_use]
    pub fn usage_url(mut self, url: impl Into<String>) -> Self {
        self.usage_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the client-side throttle
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<WafClient> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| GuardError::Config(format!("invalid store URL {}: {e}", self.base_url)))?;
        let usage_url = self
            .usage_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| GuardError::Config(format!("invalid usage URL: {e}")))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| GuardError::Config(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_second(self.rate_limit.requests_per_second)
            .allow_burst(self.rate_limit.burst_size);

        Ok(WafClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                usage_url,
                rate_limiter: RateLimiter::direct(quota),
            }),
        })
    }
}
