use thiserror::Error;

/// The vector index (or the embedder in front of it) could not serve a query.
///
/// Distinct from an empty result: `Ok(vec![])` means nothing matched.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("search request failed: {0}")]
    Request(String),

    #[error("collection not available: {0}")]
    NotReady(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("generation backend returned {status}: {details}")]
    BackendResponse { status: u16, details: String },

    #[error("generation response had no content")]
    EmptyCompletion,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("top_k must be at least 1")]
    ZeroTopK,

    #[error("score threshold {0} is outside [0, 1]")]
    ScoreThreshold(f64),

    #[error("temperature {0} is outside [0, 2]")]
    Temperature(f64),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("configured model {configured} does not match generator model {generator}")]
    ModelMismatch { configured: String, generator: String },
}
