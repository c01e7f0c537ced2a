use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("storage provider error: {0}")]
    Storage(String),
    #[error("could not extract text from {file}: {reason}")]
    Extraction { file: String, reason: String },
    #[error("embedding provider error: {0}")]
    Embedding(String),
    #[error("query has {actual} dimensions but documents have {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("generation provider error: {0}")]
    Generation(String),
    #[error("no readable documents were found in the account")]
    EmptyCorpus,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
