use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// HTTP request envelope used by source transport calls.
///
/// Only `GET` is modelled; the countries endpoint is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: String::from("OK"),
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error (no response was received).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timeout: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Async transport used by [`crate::RestCountriesSource`].
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(user_agent)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_USER_AGENT)
    }
}

impl ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let builder = request
            .headers
            .iter()
            .fold(self.client.get(&request.url), |builder, (name, value)| {
                builder.header(name, value)
            })
            .timeout(Duration::from_millis(request.timeout_ms));

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        response_from_parts(status, response.text().await)
    }
}

/// Pairs a status with its body. A body that cannot be read only fails the
/// request when the status was a success.
fn response_from_parts<E: Display>(
    status: reqwest::StatusCode,
    body: Result<String, E>,
) -> Result<HttpResponse, HttpError> {
    let status_text = status.canonical_reason().unwrap_or_default();
    match body {
        Ok(body) => Ok(HttpResponse::with_status(status.as_u16(), status_text, body)),
        Err(_) if !status.is_success() => Ok(HttpResponse::with_status(
            status.as_u16(),
            status_text,
            String::new(),
        )),
        Err(error) => Err(HttpError::new(format!("failed to read response body: {error}"))),
    }
}

fn transport_error(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::timeout(format!("request timed out: {error}"))
    } else if error.is_connect() {
        HttpError::new(format!("could not connect: {error}"))
    } else {
        HttpError::new(format!("request failed: {error}"))
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
        Box::pin(self.send(request))
    }
}

/// Offline transport that answers every request with the contents of a
/// local JSON file.
#[derive(Debug, Clone)]
pub struct FixtureHttpClient {
    path: PathBuf,
}

impl FixtureHttpClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HttpClient for FixtureHttpClient {
    fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
        Box::pin(async move {
            tracing::debug!(url = %request.url, fixture = %self.path.display(), "serving request from fixture");
            let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                HttpError::new(format!(
                    "failed to read fixture '{}': {e}",
                    self.path.display()
                ))
            })?;
            Ok(HttpResponse::ok_json(body))
        })
    }
}
