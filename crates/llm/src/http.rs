//! Shared HTTP client for the inference API
//!
//! One pooled `reqwest::Client` is built at startup and injected into the
//! embedding and chat components. Every POST goes through [`HttpClient::post_json`]:
//! - bearer authentication from configuration
//! - a semaphore capping requests in flight
//! - exponential backoff on 429/5xx and connection errors, honoring `Retry-After`
//! - per-request timeouts chosen by the caller

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use design_mentor_config::constants::http;
use design_mentor_config::{ApiConfig, HttpConfig};

use crate::LlmError;

/// Error bodies longer than this are cut before being carried in errors
const MAX_ERROR_BODY_CHARS: usize = 300;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Bearer token sent with every request
    pub api_key: Option<String>,
    /// Attempts per request, first try included
    pub max_attempts: u32,
    /// First backoff; doubles after each failed attempt
    pub initial_backoff: Duration,
    /// Cap for any single wait, server hints included
    pub max_backoff: Duration,
    /// Idle connections kept per host
    pub pool_idle_per_host: usize,
    /// Concurrent requests allowed
    pub max_in_flight: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_attempts: http::MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(http::INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(http::MAX_BACKOFF_MS),
            pool_idle_per_host: http::POOL_IDLE_PER_HOST,
            max_in_flight: http::MAX_IN_FLIGHT,
        }
    }
}

impl HttpClientConfig {
    pub fn from_settings(api: &ApiConfig, http: &HttpConfig) -> Self {
        Self {
            api_key: api.api_key.clone(),
            max_attempts: http.max_attempts,
            initial_backoff: Duration::from_millis(http.initial_backoff_ms),
            max_backoff: Duration::from_millis(http.max_backoff_ms),
            pool_idle_per_host: http.pool_idle_per_host,
            max_in_flight: http.max_in_flight,
        }
    }
}

/// Pooled HTTP client with retry
///
/// Cheap to clone; clones share the connection pool and the in-flight limit.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<HttpClientConfig>,
    in_flight: Arc<Semaphore>,
}

/// Outcome of a single failed attempt
struct AttemptFailure {
    error: LlmError,
    retryable: bool,
    retry_after: Option<Duration>,
}

impl AttemptFailure {
    fn fatal(error: LlmError) -> Self {
        Self {
            error,
            retryable: false,
            retry_after: None,
        }
    }
}

impl From<reqwest::Error> for AttemptFailure {
    fn from(err: reqwest::Error) -> Self {
        let retryable = !err.is_timeout() && (err.is_connect() || err.is_request());
        Self {
            error: err.into(),
            retryable,
            retry_after: None,
        }
    }
}

impl HttpClient {
    /// Build the client
    pub fn new(config: HttpClientConfig) -> Result<Self, LlmError> {
        if config.max_attempts == 0 {
            return Err(LlmError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let in_flight = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        tracing::debug!(
            pool_idle_per_host = config.pool_idle_per_host,
            max_in_flight = config.max_in_flight,
            max_attempts = config.max_attempts,
            "HTTP client configured with pooling and retry"
        );

        Ok(Self {
            client,
            config: Arc::new(config),
            in_flight,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// POST a JSON body and decode a JSON response, retrying transient failures
    pub async fn post_json<B, R>(&self, url: &str, body: &B, timeout: Duration) -> Result<R, LlmError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| LlmError::Configuration("HTTP client is shut down".to_string()))?;

        let max_attempts = self.config.max_attempts;
        let mut backoff = self.config.initial_backoff;
        let mut retry_after: Option<Duration> = None;
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let wait = retry_after.take().unwrap_or(backoff).min(self.config.max_backoff);
                tracing::warn!(
                    url,
                    attempt = attempt + 1,
                    max_attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = ?last_error,
                    "Upstream request failed, retrying"
                );
                tokio::time::sleep(wait).await;
                backoff = (backoff * 2).min(self.config.max_backoff);
            }

            match self.execute(url, body, timeout).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.retryable => {
                    retry_after = failure.retry_after;
                    last_error = Some(failure.error);
                }
                Err(failure) => {
                    tracing::error!(url, error = %failure.error, "Upstream request failed");
                    return Err(failure.error);
                }
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt made".to_string());
        tracing::error!(url, max_attempts, error = %detail, "Upstream retries exhausted");
        Err(LlmError::Unavailable(format!(
            "{} failed after {} attempts: {}",
            url, max_attempts, detail
        )))
    }

    /// Execute a single attempt
    async fn execute<B, R>(&self, url: &str, body: &B, timeout: Duration) -> Result<R, AttemptFailure>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(url).timeout(timeout).json(body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers(), Utc::now());
            let text = response.text().await.unwrap_or_default();
            return Err(AttemptFailure {
                error: LlmError::Status {
                    status: status.as_u16(),
                    body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                },
                retryable: is_retryable_status(status),
                retry_after,
            });
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                AttemptFailure::fatal(LlmError::Timeout)
            } else {
                AttemptFailure::fatal(LlmError::InvalidResponse(e.to_string()))
            }
        })
    }
}

/// 429 and the gateway-class 5xx responses are worth retrying
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Parse a `Retry-After` header given as delay-seconds or an HTTP date
pub fn parse_retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    // a date in the past means "retry now"
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_retry_after_seconds() {
        let headers = headers_with("7");
        assert_eq!(
            parse_retry_after(&headers, Utc::now()),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn test_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 27, 30).unwrap();
        let headers = headers_with("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(
            parse_retry_after(&headers, now),
            Some(Duration::from_secs(30))
        );

        let later = Utc.with_ymd_and_hms(2015, 10, 21, 8, 0, 0).unwrap();
        assert_eq!(parse_retry_after(&headers, later), Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_after_absent_or_garbage() {
        assert_eq!(parse_retry_after(&HeaderMap::new(), Utc::now()), None);
        assert_eq!(parse_retry_after(&headers_with("soon"), Utc::now()), None);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::NOT_IMPLEMENTED));
    }

    #[test]
    fn test_config_from_settings() {
        let api = ApiConfig {
            base_url: "http://localhost:9000".to_string(),
            api_key: Some("k".to_string()),
        };
        let http = HttpConfig {
            max_attempts: 5,
            initial_backoff_ms: 20,
            ..HttpConfig::default()
        };
        let config = HttpClientConfig::from_settings(&api, &http);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_backoff, Duration::from_millis(20));
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = HttpClientConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(HttpClient::new(config).is_err());
    }
}
