//! Contract every `CountrySource` implementation must honor, checked
//! against the REST source over each transport.

#[path = "../support/mod.rs"]
mod support;

use std::io::Write;
use std::sync::Arc;

use countryscope_core::{
    CountrySource, ExplorerConfig, FetchErrorKind, FixtureHttpClient, HttpClient, HttpResponse,
    RestCountriesSource,
};
use futures::executor::block_on;

use support::{body, country_json, ScriptedHttpClient};

struct SourceCase {
    label: &'static str,
    source: Arc<dyn CountrySource>,
}

fn scripted_case(response: HttpResponse) -> SourceCase {
    let client: Arc<dyn HttpClient> = ScriptedHttpClient::always(Ok(response));
    SourceCase {
        label: "scripted",
        source: Arc::new(RestCountriesSource::with_http_client(
            client,
            &ExplorerConfig::default(),
        )),
    }
}

fn assert_send<T: Send>(_: &T) {}

#[test]
fn fetch_future_is_send_and_source_has_stable_id() {
    let case = scripted_case(HttpResponse::ok_json(body(&[country_json("Chad", 1)])));
    let future = case.source.fetch_countries();
    assert_send(&future);
    assert_eq!(case.source.id(), "restcountries");
    drop(future);
}

#[test]
fn valid_body_yields_non_empty_validated_records() {
    let case = scripted_case(HttpResponse::ok_json(body(&[
        country_json("Chad", 17_000_000),
        country_json("Peru", 33_000_000),
    ])));

    let countries = block_on(case.source.fetch_countries()).expect(case.label);

    assert_eq!(countries.len(), 2);
    for country in &countries {
        assert!(!country.name.common.is_empty());
        assert!(!country.flags.png.is_empty());
    }
}

#[test]
fn every_failure_is_a_classified_fetch_error() {
    let cases = [
        (
            scripted_case(HttpResponse::with_status(404, "Not Found", "")),
            FetchErrorKind::HttpStatus,
        ),
        (
            scripted_case(HttpResponse::ok_json("{}")),
            FetchErrorKind::MalformedResponse,
        ),
        (
            scripted_case(HttpResponse::ok_json("[]")),
            FetchErrorKind::NoValidRecords,
        ),
    ];

    for (case, expected) in cases {
        let error = block_on(case.source.fetch_countries()).expect_err(case.label);
        assert_eq!(error.kind(), expected);
        assert!(error.code().starts_with("fetch."));
        assert!(!error.user_message().is_empty());
    }
}

#[tokio::test]
async fn fixture_transport_honors_the_same_contract() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(body(&[country_json("Chad", 17_000_000)]).as_bytes())
        .expect("write fixture");
    let source = RestCountriesSource::with_http_client(
        Arc::new(FixtureHttpClient::new(file.path())),
        &ExplorerConfig::default(),
    );

    let countries = source.fetch_countries().await.expect("fixture body");
    assert_eq!(countries.len(), 1);

    let missing = RestCountriesSource::with_http_client(
        Arc::new(FixtureHttpClient::new("/nonexistent/countries.json")),
        &ExplorerConfig::default(),
    );
    let error = missing.fetch_countries().await.expect_err("missing fixture");
    assert_eq!(error.kind(), FetchErrorKind::NetworkFailure);
}
