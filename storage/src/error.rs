use thiserror::Error;

/// Chunk store failures. Callers branch on `NotFound`/`AlreadyExists` to
/// route between first save and overwrite, everything else is surfaced.
#[derive(Debug, Error)]
pub enum ChunkStoreError {
    #[error("chunk not found at {0}")]
    NotFound(String),
    #[error("chunk already exists at {0}")]
    AlreadyExists(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("chunk codec error: {0}")]
    Codec(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, ChunkStoreError>;
