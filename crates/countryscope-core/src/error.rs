use thiserror::Error;

/// Validation and contract errors exposed by `countryscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record must be a JSON object")]
    RecordNotObject,
    #[error("field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field 'latlng' must hold exactly 2 numbers, found {len} elements")]
    InvalidCoordinates { len: usize },
    #[error("field 'population' must be a non-negative integer: {value}")]
    InvalidPopulation { value: String },

    #[error("invalid sort field '{value}', expected one of name, population")]
    InvalidSortField { value: String },
    #[error("invalid sort order '{value}', expected one of asc, desc")]
    InvalidSortOrder { value: String },
}

/// Top-level error type for core operations outside the fetch pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("endpoint must be an absolute http(s) URL: '{value}'")]
    InvalidEndpoint { value: String },

    #[error("request timeout must be greater than zero")]
    InvalidTimeout,

    #[error("cache gc time ({gc_secs}s) must not be shorter than stale time ({stale_secs}s)")]
    InvalidCacheWindow { stale_secs: u64, gc_secs: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
