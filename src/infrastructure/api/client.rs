use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use super::credentials::{redact, AuthMethod, Credentials};
use super::errors::ApiError;
use super::payload::Payload;
use super::rate_limiter::TokenBucketRateLimiter;
use super::retry::RetryPolicy;
use crate::domain::models::Config;
use crate::domain::ports::{NoopLogger, RequestLogger};
use crate::services::zones::ZonesService;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOSTNAME: &str = "api.cloudflare.com";
pub const DEFAULT_BASE_PATH: &str = "/client/v4";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const ENV_API_KEY: &str = "CLOUDFLARE_API_KEY";
pub const ENV_EMAIL: &str = "CLOUDFLARE_EMAIL";
pub const ENV_USER_SERVICE_KEY: &str = "CLOUDFLARE_API_USER_SERVICE_KEY";

/// Default user agent: library name and crate version
pub fn default_user_agent() -> String {
    format!("cloudflare-api-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client for the Cloudflare v4 API
///
/// Holds everything a request needs: resolved base URL, credentials, default
/// headers, the shared rate limiter, the retry policy and the diagnostic
/// logger. All of it is fixed at construction. Cloning is cheap and clones
/// share the rate limiter and connection pool.
#[derive(Clone)]
pub struct Client {
    pub(crate) http_client: ReqwestClient,
    pub(crate) base_url: String,
    pub(crate) user_agent: HeaderValue,
    pub(crate) default_headers: HeaderMap,
    pub(crate) credentials: Credentials,
    pub(crate) rate_limiter: Arc<TokenBucketRateLimiter>,
    pub(crate) retry_policy: RetryPolicy,
    pub(crate) logger: Arc<dyn RequestLogger>,
}

impl Client {
    /// Start configuring a client
    ///
    /// # Example
    /// ```no_run
    /// use cloudflare_api::infrastructure::api::Client;
    /// use reqwest::Method;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::builder().api_token("my-token").build()?;
    /// let body = client
    ///     .call(&CancellationToken::new(), Method::GET, "/zones", None::<Vec<u8>>)
    ///     .await?;
    /// println!("{}", String::from_utf8_lossy(&body));
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Issue a call and return the raw response body.
    ///
    /// Facades decode the `result` field themselves.
    pub async fn call(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        payload: impl Into<Payload>,
    ) -> Result<Vec<u8>, ApiError> {
        self.execute(cancel, method, path, payload.into(), None).await
    }

    /// Like [`Client::call`], with extra headers that win over the client
    /// defaults on key collision.
    pub async fn call_with_headers(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        payload: impl Into<Payload>,
        headers: &HeaderMap,
    ) -> Result<Vec<u8>, ApiError> {
        self.execute(cancel, method, path, payload.into(), Some(headers))
            .await
    }

    /// Zone operations
    pub const fn zones(&self) -> ZonesService<'_> {
        ZonesService::new(self)
    }

    /// Handle to the underlying transport. Shares the connection pool.
    pub fn http_client(&self) -> ReqwestClient {
        self.http_client.clone()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn rate_limiter(&self) -> &Arc<TokenBucketRateLimiter> {
        &self.rate_limiter
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Absolute URL for `path`
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Client defaults, then caller headers (replacing per name), then
    /// credentials, user agent and a default content type.
    pub(crate) fn request_headers(&self, extra: Option<&HeaderMap>) -> Result<HeaderMap, ApiError> {
        let mut headers = self.default_headers.clone();

        if let Some(extra) = extra {
            for name in extra.keys() {
                headers.remove(name);
            }
            for (name, value) in extra {
                headers.append(name.clone(), value.clone());
            }
        }

        self.credentials.apply(&mut headers)?;
        headers.insert(header::USER_AGENT, self.user_agent.clone());

        if !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        Ok(headers)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("retry_policy", &self.retry_policy)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Builder applying defaults field by field.
#[derive(Default)]
pub struct ClientBuilder {
    scheme: Option<String>,
    hostname: Option<String>,
    base_path: Option<String>,
    base_url: Option<String>,
    api_key: Option<(String, String)>,
    api_token: Option<String>,
    user_service_key: Option<String>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    http_client: Option<ReqwestClient>,
    timeout: Option<Duration>,
    rate_limiter: Option<Arc<TokenBucketRateLimiter>>,
    retry_policy: Option<RetryPolicy>,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl ClientBuilder {
    /// Map a loaded configuration onto a builder.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Self::default()
            .base_url(config.api.base_url.clone())
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .rate_limiter(Arc::new(TokenBucketRateLimiter::new(
                config.rate_limit.requests_per_second,
                config.rate_limit.burst_size,
            )))
            .retry_policy(RetryPolicy::from_config(&config.retry)?);

        if let Some(user_agent) = &config.api.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        for (name, value) in &config.api.headers {
            builder = builder.header(name.clone(), value.clone());
        }

        let creds = &config.credentials;
        if let Some(key) = &creds.api_key {
            builder = builder.api_key(key.clone(), creds.api_email.clone().unwrap_or_default());
        }
        if let Some(token) = &creds.api_token {
            builder = builder.api_token(token.clone());
        }
        if let Some(service_key) = &creds.user_service_key {
            builder = builder.user_service_key(service_key.clone());
        }

        Ok(builder)
    }

    /// Credentials from the well-known environment variables.
    ///
    /// Reads `CLOUDFLARE_API_TOKEN`, `CLOUDFLARE_API_KEY` with
    /// `CLOUDFLARE_EMAIL`, and `CLOUDFLARE_API_USER_SERVICE_KEY`. Unset
    /// variables leave the builder untouched.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let mut builder = Self::default();

        if let Some(token) = var(ENV_API_TOKEN) {
            builder = builder.api_token(token);
        }
        if let Some(key) = var(ENV_API_KEY) {
            builder = builder.api_key(key, var(ENV_EMAIL).unwrap_or_default());
        }
        if let Some(service_key) = var(ENV_USER_SERVICE_KEY) {
            builder = builder.user_service_key(service_key);
        }
        builder
    }

    /// Global API key and account email
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>, email: impl Into<String>) -> Self {
        self.api_key = Some((key.into(), email.into()));
        self
    }

    /// Scoped API token
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn user_service_key(mut self, key: impl Into<String>) -> Self {
        self.user_service_key = Some(key.into());
        self
    }

    /// Full base URL. Takes precedence over scheme and hostname.
    ///
    /// A trailing `/client/v4` is dropped and the base path re-applied, so the
    /// root and legacy forms of the same host resolve identically.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Header sent with every request. Repeated names accumulate values.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Inject a preconfigured transport. `timeout` is ignored when set.
    #[must_use]
    pub fn http_client(mut self, http_client: ReqwestClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Per-attempt timeout of the default transport
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Share a limiter, possibly with other clients
    #[must_use]
    pub fn rate_limiter(mut self, rate_limiter: Arc<TokenBucketRateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    #[must_use]
    pub const fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = Some(retry_policy);
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Validate and assemble the client.
    pub fn build(self) -> Result<Client, ApiError> {
        let credentials = self.credentials()?;
        let base_url = self.resolve_base_url()?;

        let user_agent_text = self.user_agent.clone().unwrap_or_else(default_user_agent);
        let user_agent = HeaderValue::from_str(&user_agent_text).map_err(|e| ApiError::InvalidHeader {
            name: "user-agent".to_string(),
            reason: e.to_string(),
        })?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            default_headers.append(header_name, header_value);
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => ReqwestClient::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .tcp_nodelay(true)
                .build()
                .map_err(ApiError::HttpClient)?,
        };

        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(TokenBucketRateLimiter::default()));
        let retry_policy = self.retry_policy.unwrap_or_default();
        let logger = self.logger.unwrap_or_else(|| Arc::new(NoopLogger));

        info!(
            base_url = %base_url,
            auth = %describe_auth(&credentials),
            rate_limit_rps = rate_limiter.refill_rate(),
            max_retries = retry_policy.max_retries(),
            "Initializing API client"
        );

        Ok(Client {
            http_client,
            base_url,
            user_agent,
            default_headers,
            credentials,
            rate_limiter,
            retry_policy,
            logger,
        })
    }

    fn credentials(&self) -> Result<Credentials, ApiError> {
        let api_key = self.api_key.as_ref().filter(|(key, _)| !key.is_empty());
        let api_token = self.api_token.as_deref().filter(|t| !t.is_empty());

        let credentials = match (api_key, api_token) {
            (Some(_), Some(_)) => return Err(ApiError::ConflictingCredentials),
            (Some((key, email)), None) => Credentials::api_key(key.clone(), email.clone()),
            (None, Some(token)) => Credentials::token(token),
            (None, None) => Credentials::default(),
        };

        Ok(match self.user_service_key.as_deref().filter(|k| !k.is_empty()) {
            Some(service_key) => credentials.with_user_service_key(service_key),
            None => credentials,
        })
    }

    fn resolve_base_url(&self) -> Result<String, ApiError> {
        let root = match &self.base_url {
            Some(raw) => parse_root(raw)?,
            None => {
                let scheme = self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
                let scheme = scheme.trim_end_matches("://");
                let hostname = self.hostname.as_deref().unwrap_or(DEFAULT_HOSTNAME);
                parse_root(&format!("{scheme}://{hostname}"))?
            }
        };

        let base_path = self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH);
        let base_path = base_path.trim_matches('/');

        Ok(if base_path.is_empty() {
            root
        } else {
            format!("{root}/{base_path}")
        })
    }
}

/// Validate a base URL and reduce it to its root.
///
/// Older configurations carry the versioned path in the URL or hostname; it is
/// stripped here so the base path is applied exactly once.
fn parse_root(raw: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "query and fragment are not allowed".to_string(),
        });
    }

    let trimmed = parsed.as_str().trim_end_matches('/');
    let root = trimmed.strip_suffix(DEFAULT_BASE_PATH).unwrap_or(trimmed);
    Ok(root.trim_end_matches('/').to_string())
}

fn describe_auth(credentials: &Credentials) -> String {
    match credentials.auth() {
        Some(AuthMethod::Token(token)) => format!("token {}", redact(token)),
        Some(AuthMethod::ApiKey { key, email }) => format!("api_key {} ({email})", redact(key)),
        None if credentials.is_empty() => "none".to_string(),
        None => "user_service_key".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Config, CredentialsConfig};
    use crate::infrastructure::api::credentials::{X_AUTH_EMAIL, X_AUTH_KEY};

    fn token_client() -> Client {
        Client::builder().api_token("test-token").build().unwrap()
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(token_client().base_url(), "https://api.cloudflare.com/client/v4");
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = Client::builder()
            .api_token("t")
            .base_url("https://api.cloudflare.com/client/v4/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://api.cloudflare.com/client/v4");
        assert_eq!(
            client.endpoint("/zones"),
            "https://api.cloudflare.com/client/v4/zones"
        );
    }

    #[test]
    fn test_legacy_and_root_base_url_resolve_identically() {
        let build = |raw: &str| {
            Client::builder()
                .api_token("t")
                .base_url(raw)
                .build()
                .unwrap()
                .base_url()
                .to_string()
        };

        let legacy = build("https://api.example.com/client/v4");
        let root = build("https://api.example.com");
        assert_eq!(legacy, root);
        assert_eq!(root, "https://api.example.com/client/v4");
        assert_eq!(build("https://api.example.com/"), root);
    }

    #[test]
    fn test_base_url_with_custom_base_path() {
        let client = Client::builder()
            .api_token("t")
            .base_url("http://127.0.0.1:9000/client/v4")
            .base_path("/v5")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000/v5");
        assert_eq!(client.endpoint("/zones"), "http://127.0.0.1:9000/v5/zones");
    }

    #[test]
    fn test_hostname_and_path_components() {
        let client = Client::builder()
            .api_token("t")
            .scheme("http")
            .hostname("localhost:8080")
            .base_path("/client/v4/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/client/v4");
    }

    #[test]
    fn test_legacy_hostname_with_version_suffix() {
        let client = Client::builder()
            .api_token("t")
            .hostname("api.staging.cloudflare.com/client/v4/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://api.staging.cloudflare.com/client/v4");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        for raw in ["not a url", "ftp://example.com", "https://example.com/?a=b"] {
            let result = Client::builder().api_token("t").base_url(raw).build();
            assert!(
                matches!(result, Err(ApiError::InvalidBaseUrl { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_key_and_token_are_mutually_exclusive() {
        let result = Client::builder()
            .api_key("key", "user@example.com")
            .api_token("token")
            .build();
        assert!(matches!(result, Err(ApiError::ConflictingCredentials)));
    }

    #[test]
    fn test_client_without_credentials_builds() {
        let client = Client::builder().build().unwrap();
        assert!(client.credentials().is_empty());
        assert!(matches!(
            client.request_headers(None),
            Err(ApiError::NoCredentials)
        ));
    }

    #[test]
    fn test_request_headers_defaults() {
        let headers = token_client().request_headers(None).unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer test-token");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(
            headers.get(header::USER_AGENT).unwrap().to_str().unwrap(),
            default_user_agent()
        );
    }

    #[test]
    fn test_extra_headers_win_over_defaults() {
        let client = Client::builder()
            .api_key("key", "user@example.com")
            .header("x-team", "default")
            .header("x-trace", "keep")
            .build()
            .unwrap();

        let mut extra = HeaderMap::new();
        extra.insert("x-team", HeaderValue::from_static("override"));
        extra.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let headers = client.request_headers(Some(&extra)).unwrap();
        assert_eq!(headers.get_all("x-team").iter().count(), 1);
        assert_eq!(headers.get("x-team").unwrap(), "override");
        assert_eq!(headers.get("x-trace").unwrap(), "keep");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get(X_AUTH_KEY).unwrap(), "key");
        assert_eq!(headers.get(X_AUTH_EMAIL).unwrap(), "user@example.com");
    }

    #[test]
    fn test_custom_user_agent() {
        let client = Client::builder()
            .api_token("t")
            .user_agent("terraform/1.0")
            .build()
            .unwrap();
        let headers = client.request_headers(None).unwrap();
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), "terraform/1.0");
    }

    #[test]
    fn test_invalid_default_header_rejected() {
        let result = Client::builder().api_token("t").header("bad header", "x").build();
        assert!(matches!(result, Err(ApiError::InvalidHeader { .. })));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.credentials = CredentialsConfig {
            api_token: Some("config-token".to_string()),
            user_service_key: Some("v1.0-svc".to_string()),
            ..Default::default()
        };
        config.retry.max_retries = 7;
        config.rate_limit.requests_per_second = 20.0;
        config
            .api
            .headers
            .insert("x-origin".to_string(), "config".to_string());

        let client = ClientBuilder::from_config(&config).unwrap().build().unwrap();
        assert_eq!(client.retry_policy().max_retries(), 7);
        assert!((client.rate_limiter().refill_rate() - 20.0).abs() < f64::EPSILON);

        let headers = client.request_headers(None).unwrap();
        assert_eq!(headers.get("x-origin").unwrap(), "config");
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer config-token");
    }

    #[test]
    fn test_from_env_reads_well_known_variables() {
        temp_env::with_vars(
            [
                (ENV_API_TOKEN, None),
                (ENV_API_KEY, Some("env-key")),
                (ENV_EMAIL, Some("ops@example.com")),
                (ENV_USER_SERVICE_KEY, Some("v1.0-env")),
            ],
            || {
                let client = ClientBuilder::from_env().build().unwrap();
                let headers = client.request_headers(None).unwrap();
                assert_eq!(headers.get(X_AUTH_KEY).unwrap(), "env-key");
                assert_eq!(headers.get(X_AUTH_EMAIL).unwrap(), "ops@example.com");
                assert!(headers.get(header::AUTHORIZATION).is_none());
            },
        );
    }

    #[test]
    fn test_clones_share_rate_limiter() {
        let client = token_client();
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.rate_limiter(), clone.rate_limiter()));
    }
}
