use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::errors::DecorApiError;
use super::rate_limiter::TokenBucketRateLimiter;
use super::retry::RetryPolicy;
use crate::domain::errors::{DecorError, DecorResult};
use crate::domain::models::{Config, Decoration, NewDecoration, Preset, RetryConfig, UserId};
use crate::domain::ports::{DecorApi, UsersDecorations, UsersDecorationsLookup};

/// Configuration for the decoration service client
#[derive(Clone)]
pub struct DecorClientConfig {
    /// Base URL of the JSON API, without trailing slash
    pub base_url: String,

    /// Bearer token; only current-user endpoints need it
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Rate limit in requests per second
    pub rate_limit_rps: f64,

    /// Token bucket burst size
    pub burst_size: u32,

    pub retry: RetryConfig,
}

impl DecorClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            token: config.api.token.clone(),
            timeout_secs: config.api.timeout_secs,
            rate_limit_rps: config.rate_limit.requests_per_second,
            burst_size: config.rate_limit.burst_size,
            retry: config.retry.clone(),
        }
    }
}

impl Default for DecorClientConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn redact(token: Option<&str>) -> String {
    match token {
        Some(token) if token.chars().count() > 8 => {
            format!("{}...[REDACTED]", token.chars().take(4).collect::<String>())
        }
        Some(_) => "[REDACTED]".to_string(),
        None => "none".to_string(),
    }
}

/// HTTP client for the decoration service
///
/// Every request goes through the token bucket and the retry policy. Requests
/// are rebuilt per attempt since multipart bodies cannot be replayed.
pub struct DecorClient {
    http_client: ReqwestClient,
    base_url: String,
    token: Option<String>,
    rate_limiter: TokenBucketRateLimiter,
    retry_policy: RetryPolicy,
}

impl DecorClient {
    pub fn new(config: DecorClientConfig) -> Result<Self, DecorApiError> {
        info!(
            "Initializing decoration client: base_url={}, rate_limit={} rps, timeout={}s, token={}",
            config.base_url,
            config.rate_limit_rps,
            config.timeout_secs,
            redact(config.token.as_deref())
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .user_agent(concat!("decor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            rate_limiter: TokenBucketRateLimiter::new(config.rate_limit_rps, config.burst_size),
            retry_policy: RetryPolicy::from(&config.retry),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, DecorApiError> {
        let token = self.token.as_deref().ok_or(DecorApiError::Unauthorized)?;
        Ok(builder.bearer_auth(token))
    }

    /// Send a freshly built request per attempt, failing on non-success status
    async fn execute<F>(&self, build: F) -> Result<Response, DecorApiError>
    where
        F: Fn() -> Result<RequestBuilder, DecorApiError>,
    {
        self.retry_policy
            .execute(|| async {
                let request = build()?;
                self.rate_limiter.acquire().await;
                let response = request.send().await?;
                Self::check_status(response).await
            })
            .await
    }

    async fn check_status(response: Response) -> Result<Response, DecorApiError> {
        let status = response.status();
        debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        Err(DecorApiError::from_status(status, body))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, DecorApiError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn image_part(decoration: &NewDecoration) -> Result<Part, DecorApiError> {
        Ok(Part::bytes(decoration.file.bytes.clone())
            .file_name(decoration.file.name.clone())
            .mime_str(decoration.file.mime_type())?)
    }
}

#[async_trait]
impl UsersDecorationsLookup for DecorClient {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn users_decorations(&self, ids: &[UserId]) -> DecorResult<UsersDecorations> {
        if ids.is_empty() {
            return Ok(UsersDecorations::new());
        }

        let ids_json = serde_json::to_string(ids)?;
        let response = self
            .execute(|| {
                Ok(self
                    .http_client
                    .get(self.url("/users"))
                    .query(&[("ids", ids_json.as_str())]))
            })
            .await?;

        Ok(Self::json(response).await?)
    }
}

#[async_trait]
impl DecorApi for DecorClient {
    #[instrument(skip(self))]
    async fn user_decorations(&self) -> DecorResult<Vec<Decoration>> {
        let response = self
            .execute(|| self.authorized(self.http_client.get(self.url("/users/@me/decorations"))))
            .await?;
        Ok(Self::json(response).await?)
    }

    #[instrument(skip(self))]
    async fn user_decoration(&self) -> DecorResult<Option<Decoration>> {
        let response = self
            .execute(|| self.authorized(self.http_client.get(self.url("/users/@me/decoration"))))
            .await?;
        Ok(Self::json(response).await?)
    }

    #[instrument(skip(self, decoration), fields(hash = ?decoration.map(|d| &d.hash)))]
    async fn set_user_decoration(&self, decoration: Option<&Decoration>) -> DecorResult<()> {
        let hash = decoration.map_or_else(|| "null".to_string(), |d| d.hash.clone());
        self.execute(|| {
            let form = Form::new().text("hash", hash.clone());
            self.authorized(
                self.http_client
                    .put(self.url("/users/@me/decoration"))
                    .multipart(form),
            )
        })
        .await?;
        Ok(())
    }

    #[instrument(skip(self, decoration), fields(alt = %decoration.alt))]
    async fn create_decoration(&self, decoration: &NewDecoration) -> DecorResult<Decoration> {
        let response = self
            .execute(|| {
                let form = Form::new()
                    .part("image", Self::image_part(decoration)?)
                    .text("alt", decoration.alt.clone());
                self.authorized(
                    self.http_client
                        .put(self.url("/users/@me/decoration"))
                        .multipart(form),
                )
            })
            .await?;
        Ok(Self::json(response).await?)
    }

    #[instrument(skip(self))]
    async fn delete_decoration(&self, hash: &str) -> DecorResult<()> {
        self.execute(|| {
            self.authorized(
                self.http_client
                    .delete(self.url(&format!("/decorations/{hash}"))),
            )
        })
        .await
        .map_err(|err| match err {
            DecorApiError::NotFound => DecorError::DecorationNotFound(hash.to_string()),
            other => other.into(),
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn presets(&self) -> DecorResult<Vec<Preset>> {
        let response = self
            .execute(|| Ok(self.http_client.get(self.url("/decorations/presets"))))
            .await?;
        Ok(Self::json(response).await?)
    }
}
