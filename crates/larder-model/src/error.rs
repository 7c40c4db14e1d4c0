use thiserror::Error;

/// Fatal data errors: the run cannot continue because downstream
/// values can no longer be trusted.
#[derive(Debug, Error)]
pub enum DataError {
    /// A timestamp column contained a non-empty value outside the
    /// fixed source format.
    #[error("malformed timestamp in {column}: {value:?}")]
    MalformedTimestamp { column: String, value: String },

    /// A required source column is absent.
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
