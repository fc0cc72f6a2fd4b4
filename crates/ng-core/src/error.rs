use thiserror::Error;

/// Why a project document could not be loaded.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not JSON, or JSON of the wrong shape.
    #[error("malformed project document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported project version {found} (expected {expected})")]
    VersionMismatch { found: i64, expected: i64 },

    /// Parseable, but structurally unusable (e.g. no version field).
    #[error("invalid project document: {0}")]
    Invalid(String),
}
