//! Errors raised while building records, snapshots and configuration from
//! JSON. Cell operations themselves never fail.

/// Errors returned by the fallible parts of the crate.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The input was not valid JSON or did not match the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record was built from a JSON value that is not an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// Kind of JSON value that was found instead.
        found: &'static str,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
