//! Runtime configuration for the fetch pipeline.

use crate::cache::CacheConfig;
use crate::CoreError;

/// Collection endpoint of the public countries API.
pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1/all";

/// Field subset requested from the countries API.
pub const COUNTRY_FIELDS: [&str; 10] = [
    "name",
    "nativeName",
    "region",
    "latlng",
    "flags",
    "timezones",
    "population",
    "postalCodes",
    "currencies",
    "capital",
];

pub const DEFAULT_USER_AGENT: &str = concat!("countryscope/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Builds `<base>?fields=a,b,c` for the given base URL.
pub fn endpoint_with_fields(base_url: &str, fields: &[&str]) -> String {
    let fields = fields
        .iter()
        .map(|field| urlencoding::encode(field).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    format!("{base_url}?fields={fields}")
}

pub fn default_endpoint() -> String {
    endpoint_with_fields(DEFAULT_BASE_URL, &COUNTRY_FIELDS)
}

/// Source and cache settings for a countryscope session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    /// Full request URL including the `fields` query.
    pub endpoint: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub cache: CacheConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: String::from(DEFAULT_USER_AGENT),
            cache: CacheConfig::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Checks the settings before any request is issued.
    pub fn validate(&self) -> Result<(), CoreError> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://"))
            || endpoint.contains(char::is_whitespace)
        {
            return Err(CoreError::InvalidEndpoint {
                value: self.endpoint.clone(),
            });
        }

        if self.timeout_ms == 0 {
            return Err(CoreError::InvalidTimeout);
        }

        if self.cache.gc_time < self.cache.stale_time {
            return Err(CoreError::InvalidCacheWindow {
                stale_secs: self.cache.stale_time.as_secs(),
                gc_secs: self.cache.gc_time.as_secs(),
            });
        }

        Ok(())
    }
}
