//! Shared fixtures for the integration tests: scripted transports and
//! sources that count their calls, plus builders for raw records.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use countryscope_core::{
    validate_record, Country, CountrySource, FetchError, FetchFuture, HttpClient, HttpError,
    HttpFuture, HttpRequest, HttpResponse,
};
use serde_json::{json, Value};

/// A complete, valid raw record.
pub fn country_json(common: &str, population: u64) -> Value {
    json!({
        "name": {
            "common": common,
            "official": format!("Republic of {common}"),
            "nativeName": {}
        },
        "flags": { "png": format!("https://flagcdn.com/w320/{}.png", common.to_lowercase()) },
        "region": "Test",
        "latlng": [1.0, 2.0],
        "population": population,
        "timezones": ["UTC"],
        "currencies": {},
        "capital": [format!("{common} City")]
    })
}

/// JSON array body holding `records`.
pub fn body(records: &[Value]) -> String {
    Value::Array(records.to_vec()).to_string()
}

pub fn country(common: &str, population: u64) -> Country {
    validate_record(&country_json(common, population)).expect("builder yields a valid record")
}

/// The two-record set used by the worked scenarios.
pub fn chad_and_china() -> Vec<Country> {
    vec![country("Chad", 17_000_000), country("China", 1_400_000_000)]
}

type HttpOutcome = Result<HttpResponse, HttpError>;

/// `HttpClient` that replays queued outcomes, then repeats the fallback.
pub struct ScriptedHttpClient {
    script: Mutex<VecDeque<HttpOutcome>>,
    fallback: HttpOutcome,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn always(outcome: HttpOutcome) -> Arc<Self> {
        Self::scripted(Vec::new(), outcome)
    }

    pub fn scripted(script: Vec<HttpOutcome>, fallback: HttpOutcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().expect("requests lock").last().cloned()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
        self.requests.lock().expect("requests lock").push(request);
        let outcome = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Box::pin(async move { outcome })
    }
}

type SourceOutcome = Result<Vec<Country>, FetchError>;

/// `CountrySource` that counts calls and optionally takes time to answer.
pub struct ScriptedSource {
    script: Mutex<VecDeque<SourceOutcome>>,
    fallback: SourceOutcome,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn ok(countries: Vec<Country>) -> Arc<Self> {
        Self::scripted(Vec::new(), Ok(countries), Duration::ZERO)
    }

    pub fn failing(error: FetchError) -> Arc<Self> {
        Self::scripted(Vec::new(), Err(error), Duration::ZERO)
    }

    pub fn slow(countries: Vec<Country>, latency: Duration) -> Arc<Self> {
        Self::scripted(Vec::new(), Ok(countries), latency)
    }

    pub fn scripted(
        script: Vec<SourceOutcome>,
        fallback: SourceOutcome,
        latency: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            latency,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CountrySource for ScriptedSource {
    fn id(&self) -> &'static str {
        "scripted"
    }

    fn fetch_countries(&self) -> FetchFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            outcome
        })
    }
}
