//! Small JSON-over-HTTP client with redacted logging and optional retries.
//!
//! - Request options: `Auth`, query params, timeout, retries
//! - Redacts secret-looking query params and never logs bearer values
//! - Retries 429/5xx with exponential backoff and `Retry-After` support when asked to
//! - Optional *raw* request/response logging via `HASHTALLY_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), hashtally_http::HttpError> {
//! let client = hashtally_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("1.1/items.json", hashtally_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Non-success responses become [`HttpError::Api`] carrying the platform's
//! own error code and message when the body has one
//! (`{"errors":[{"code":50,"message":"User not found."}]}`).

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

const RAW_ENV: &str = "HASHTALLY_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
            | "oauth_token"
    )
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("authorization") {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned {status} (code {code:?}): {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        code: Option<i64>,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// Best error number to show a user: the platform code, else the HTTP status.
    pub fn code(&self) -> Option<i64> {
        match self {
            HttpError::Api { status, code, .. } => {
                Some(code.unwrap_or_else(|| i64::from(status.as_u16())))
            }
            _ => None,
        }
    }

    /// Human-readable message without the envelope added by `Display`.
    pub fn message(&self) -> String {
        match self {
            HttpError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Authentication strategies supported by [`HttpClient`].
///
/// ```
/// use hashtally_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// assert!(matches!(bearer, Auth::Bearer("token")));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
}

/// Per-request tuning knobs.
///
/// ```
/// use hashtally_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(0),
///     query: Some(vec![("screen_name", "ferris".into())]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.auth.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A missing trailing slash is added so relative paths extend the base
    /// instead of replacing its last segment.
    ///
    /// ```no_run
    /// use hashtally_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("hashtally/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 0,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, path, opts).await
    }

    async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let bearer = match &opts.auth {
            Some(Auth::Bearer(tok)) => Some(sanitize_bearer(tok)?),
            None => None,
        };
        let auth_kind = if bearer.is_some() { "bearer" } else { "none" };

        let query: Vec<(&str, &str)> = opts
            .query
            .as_ref()
            .map(|q| q.iter().map(|(k, v)| (*k, v.as_ref())).collect())
            .unwrap_or_default();
        let redacted_q: Vec<(&str, &str)> = query
            .iter()
            .map(|(k, v)| (*k, if is_secret_param(k) { "<redacted>" } else { *v }))
            .collect();

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let mut attempt = 0usize;

        loop {
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if !query.is_empty() {
                rb = rb.query(&query);
            }
            if let Some(tok) = &bearer {
                rb = rb.bearer_auth(tok);
            }

            let req_id = format!(
                "r{:x}",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos()
            );

            tracing::debug!(
                req_id = %req_id,
                attempt = attempt + 1,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query = ?redacted_q,
                timeout_ms = timeout.as_millis() as u64,
                auth_kind,
                "http.request.start"
            );

            let t0 = std::time::Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b))
                }
                Err(err) => Err(err),
            };
            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id = %req_id,
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(req_id = %req_id, attempt, message = %message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let request_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-transaction-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

            tracing::debug!(
                req_id = %req_id,
                %status,
                duration_ms = dur_ms,
                body_len = bytes.len(),
                x_request_id = %request_id,
                rate_limit.limit = ?header_str("x-rate-limit-limit"),
                rate_limit.remaining = ?header_str("x-rate-limit-remaining"),
                rate_limit.reset = ?header_str("x-rate-limit-reset"),
                "http.response.headers"
            );

            if raw_enabled() {
                let end = bytes.len().min(RAW_MAX_BODY);
                let hdrs = redact_headers(&headers);
                let text = String::from_utf8_lossy(&bytes[..end]);
                tracing::debug!(
                    target: "http.raw",
                    req_id = %req_id,
                    %status,
                    headers = ?hdrs,
                    body = %text,
                    truncated = bytes.len() > RAW_MAX_BODY,
                    "response"
                );
            }

            let snippet = snip_body(&bytes);

            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id = %req_id,
                        serde_line = %e.line(),
                        serde_col = %e.column(),
                        serde_err = %e,
                        body_snippet = %snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let (code, message) = extract_api_error(&bytes);
            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;

            if (is_429 || status.is_server_error()) && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_delay_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None if is_429 => backoff(attempt).max(Duration::from_millis(1100)),
                    None => backoff(attempt),
                };
                tracing::warn!(
                    req_id = %req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    message = %message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id = %req_id,
                %status,
                ?code,
                message = %message,
                x_request_id = %request_id,
                body_snippet = %snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                code,
                message,
                request_id,
            });
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(10) as u32;
    Duration::from_millis(200u64.saturating_mul(1 << shift))
}

/// Pull `(code, message)` out of the error bodies the platform sends.
fn extract_api_error(body: &[u8]) -> (Option<i64>, String) {
    // v1.1: {"errors":[{"code":50,"message":"User not found."}]}
    // v2:   {"errors":[{"title":"...","detail":"..."}]}
    #[derive(Deserialize)]
    struct Errors {
        errors: Vec<ErrorEntry>,
    }
    #[derive(Deserialize)]
    struct ErrorEntry {
        #[serde(default)]
        code: Option<i64>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // {"error":"Not authorized."} or {"title":"...","detail":"..."}
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        error: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    if let Ok(env) = serde_json::from_slice::<Errors>(body) {
        if let Some(first) = env.errors.into_iter().next() {
            let message = [first.message, first.detail, first.title]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            return (first.code, message);
        }
    }
    if let Ok(flat) = serde_json::from_slice::<Flat>(body) {
        if let Some(message) = [flat.error, flat.detail, flat.title]
            .into_iter()
            .find(|s| !s.is_empty())
        {
            return (None, message);
        }
    }
    (None, snip_body(body))
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

fn sanitize_bearer(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("bearer token is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("bearer token contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "bearer token contains control characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_v1_error_code_and_message() {
        let body = br#"{"errors":[{"code":50,"message":"User not found."}]}"#;
        assert_eq!(
            extract_api_error(body),
            (Some(50), "User not found.".to_string())
        );
    }

    #[test]
    fn extracts_v2_detail_without_code() {
        let body = br#"{"errors":[{"title":"Not Found Error","detail":"Could not find user"}]}"#;
        assert_eq!(
            extract_api_error(body),
            (None, "Could not find user".to_string())
        );
    }

    #[test]
    fn extracts_flat_error_string() {
        let body = br#"{"request":"/1.1/statuses/user_timeline.json","error":"Not authorized."}"#;
        assert_eq!(extract_api_error(body), (None, "Not authorized.".to_string()));
    }

    #[test]
    fn falls_back_to_body_snippet() {
        assert_eq!(extract_api_error(b"gateway down"), (None, "gateway down".to_string()));
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_MAX + 3);
    }

    #[test]
    fn bearer_is_trimmed_and_validated() {
        assert_eq!(sanitize_bearer(" \"abc def\"\n").unwrap(), "abcdef");
        assert!(sanitize_bearer("   ").is_err());
        assert!(sanitize_bearer("tökén").is_err());
    }

    #[test]
    fn secret_params_are_recognised() {
        assert!(is_secret_param("Access_Token"));
        assert!(is_secret_param("api_key"));
        assert!(!is_secret_param("screen_name"));
    }

    #[test]
    fn api_error_code_falls_back_to_status() {
        let err = HttpError::Api {
            status: StatusCode::UNAUTHORIZED,
            code: None,
            message: "Not authorized.".into(),
            request_id: "-".into(),
        };
        assert_eq!(err.code(), Some(401));
        assert_eq!(err.message(), "Not authorized.");
        assert_eq!(HttpError::Network("boom".into()).code(), None);
    }

    #[test]
    fn backoff_grows_and_caps() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
        assert_eq!(backoff(50), backoff(11));
    }
}
