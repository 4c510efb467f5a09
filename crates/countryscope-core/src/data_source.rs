//! Country data source contract and the REST implementation.
//!
//! [`CountrySource`] is the seam between the query cache and the network.
//! [`RestCountriesSource`] issues one `GET` per call, checks the status,
//! requires a top-level JSON array and validates every element, dropping
//! the ones that do not match the record shape.
//!
//! # Failure kinds
//!
//! | Kind | Cause |
//! |------|-------|
//! | [`FetchErrorKind::NetworkFailure`] | No response (connect, timeout, I/O) |
//! | [`FetchErrorKind::HttpStatus`] | Non-2xx status |
//! | [`FetchErrorKind::MalformedResponse`] | Body is not JSON or not an array |
//! | [`FetchErrorKind::NoValidRecords`] | Array present but every element rejected |
//!
//! No retries happen here; see [`crate::cache::QueryCache`].

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::ExplorerConfig;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::validate::validate_record;
use crate::Country;

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    HttpStatus,
    MalformedResponse,
    NoValidRecords,
    NetworkFailure,
}

/// Structured fetch failure surfaced through the cache unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_text: Option<String>,
}

impl FetchError {
    pub fn http_status(status: u16, status_text: impl Into<String>) -> Self {
        let status_text = status_text.into();
        Self {
            kind: FetchErrorKind::HttpStatus,
            message: format!("Failed to fetch countries: {status} {status_text}")
                .trim_end()
                .to_owned(),
            status: Some(status),
            status_text: Some(status_text),
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::MalformedResponse,
            message: message.into(),
            status: None,
            status_text: None,
        }
    }

    pub fn no_valid_records(candidates: usize) -> Self {
        Self {
            kind: FetchErrorKind::NoValidRecords,
            message: format!(
                "No valid countries found in the API response ({candidates} candidates rejected)"
            ),
            status: None,
            status_text: None,
        }
    }

    pub fn network_failure(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NetworkFailure,
            message: message.into(),
            status: None,
            status_text: None,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::HttpStatus => "fetch.http_status",
            FetchErrorKind::MalformedResponse => "fetch.malformed_response",
            FetchErrorKind::NoValidRecords => "fetch.no_valid_records",
            FetchErrorKind::NetworkFailure => "fetch.network_failure",
        }
    }

    /// Single human-readable line for the error banner.
    pub fn user_message(&self) -> String {
        match self.kind {
            FetchErrorKind::NetworkFailure => String::from(
                "Failed to load countries. Please check your internet connection and try again.",
            ),
            _ => format!("Failed to load countries: {}", self.message),
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Boxed future returned by [`CountrySource::fetch_countries`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Country>, FetchError>> + Send + 'a>>;

/// Source contract for the full country record set.
///
/// Implementations must be `Send + Sync`; the cache shares one source
/// between all callers.
pub trait CountrySource: Send + Sync {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetches and validates the whole record set.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] for transport failures, non-2xx statuses,
    /// non-array bodies, and bodies in which no record passed validation.
    fn fetch_countries(&self) -> FetchFuture<'_>;
}

/// [`CountrySource`] backed by the public REST endpoint.
#[derive(Clone)]
pub struct RestCountriesSource {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    timeout_ms: u64,
}

impl Default for RestCountriesSource {
    fn default() -> Self {
        Self::from_config(&ExplorerConfig::default())
    }
}

impl RestCountriesSource {
    /// Source using the real reqwest transport.
    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self::with_http_client(
            Arc::new(ReqwestHttpClient::new(&config.user_agent)),
            config,
        )
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: &ExplorerConfig) -> Self {
        Self {
            http_client,
            endpoint: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<Vec<Country>, FetchError> {
        info!(endpoint = %self.endpoint, "fetching countries");

        let request = HttpRequest::get(&self.endpoint)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            error!(error = %e, timeout = e.is_timeout(), "countries request failed");
            FetchError::network_failure(e.message())
        })?;

        if !response.is_success() {
            error!(
                status = response.status,
                status_text = %response.status_text,
                "countries response not ok"
            );
            return Err(FetchError::http_status(response.status, response.status_text));
        }

        parse_countries(&response.body)
    }
}

impl CountrySource for RestCountriesSource {
    fn id(&self) -> &'static str {
        "restcountries"
    }

    fn fetch_countries(&self) -> FetchFuture<'_> {
        Box::pin(self.fetch())
    }
}

/// Parses a response body into validated records.
///
/// Elements that fail validation are logged and skipped.
pub fn parse_countries(body: &str) -> Result<Vec<Country>, FetchError> {
    let data: Value = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "countries response is not valid JSON");
        FetchError::malformed_response(format!("Invalid API response: {e}"))
    })?;

    let Value::Array(candidates) = data else {
        error!(kind = json_kind(&data), "countries response is not an array");
        return Err(FetchError::malformed_response(
            "Invalid API response: expected an array of countries",
        ));
    };

    let countries = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| match validate_record(candidate) {
            Ok(country) => Some(country),
            Err(reason) => {
                warn!(index, %reason, "dropping invalid country record");
                None
            }
        })
        .collect::<Vec<_>>();

    if countries.is_empty() {
        error!(total = candidates.len(), "no valid countries found in response");
        return Err(FetchError::no_valid_records(candidates.len()));
    }

    info!(
        accepted = countries.len(),
        rejected = candidates.len() - countries.len(),
        "processed countries"
    );
    Ok(countries)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
