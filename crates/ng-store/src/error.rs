use ng_core::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no project named {0:?}")]
    NotFound(String),

    #[error("a project named {0:?} already exists")]
    NameTaken(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(CodecError::Parse(e))
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
