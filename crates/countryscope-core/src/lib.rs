//! # countryscope Core
//!
//! Fetch, validate, cache, filter and sort country records from the public
//! REST Countries API.
//!
//! ## Overview
//!
//! This crate is the data pipeline behind the `countryscope` CLI:
//!
//! - **Record model** for countries with accessor helpers
//! - **Data source trait** with a REST implementation and structured errors
//! - **Schema validation** that drops malformed records instead of failing
//! - **Query cache** with request de-duplication, freshness, eviction and retry
//! - **View engine**: a pure filter/sort over the cached record set
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Query cache with in-flight de-duplication |
//! | [`config`] | Endpoint, timeout and cache settings |
//! | [`data_source`] | Source trait, REST source, fetch errors |
//! | [`domain`] | Country model and query state |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`retry`] | Retry policy and backoff |
//! | [`validate`] | Per-record schema validation |
//! | [`view`] | Filter/sort engine and list status |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use countryscope_core::{view, QueryCache, RestCountriesSource, SortField, SortOrder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = QueryCache::with_defaults(Arc::new(RestCountriesSource::default()));
//!     let countries = cache.fetch().await?;
//!
//!     for country in view(&countries, "ch", SortField::Population, SortOrder::Descending) {
//!         println!("{}: {}", country.name.common, country.formatted_population());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │──── ExplorerState ────┐
//! └────────┬────────┘                       │
//!          │                                ▼
//!          ▼                       ┌──────────────────┐
//! ┌─────────────────┐              │ view (filter/    │
//! │  Query Cache    │── records ──▶│ sort, memoized)  │
//! └────────┬────────┘              └──────────────────┘
//!          │ retry, de-dup
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Country Source  │────▶│ HTTP Client      │
//! │ (validation)    │     │ (reqwest/file)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Fetch failures are a single structured value:
//!
//! ```rust
//! use countryscope_core::{FetchError, FetchErrorKind};
//!
//! fn banner(error: &FetchError) -> String {
//!     match error.kind() {
//!         FetchErrorKind::HttpStatus => format!("server said {:?}", error.status()),
//!         _ => error.user_message(),
//!     }
//! }
//! ```
//!
//! Records that fail validation are logged and dropped; they only become an
//! error ([`FetchErrorKind::NoValidRecords`]) when nothing is left.

pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod retry;
pub mod validate;
pub mod view;

// Caching
pub use cache::{CacheConfig, CountrySet, QueryCache, QuerySnapshot, COUNTRIES_QUERY_KEY};

// Configuration
pub use config::{default_endpoint, ExplorerConfig};

// Data source trait and types
pub use data_source::{
    parse_countries, CountrySource, FetchError, FetchErrorKind, FetchFuture, RestCountriesSource,
};

// Domain models
pub use domain::{
    format_grouped, Coordinates, Country, CountryName, Currency, ExplorerState, Flags, NativeName,
    SortField, SortOrder,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Validation
pub use validate::validate_record;

// View engine
pub use view::{compare, view, ListStatus, MemoizedView, ViewQuery};
