use thiserror::Error;

pub type RecommendResult<T> = Result<T, RecommendError>;

/// The four error kinds the pipeline and its REST adapter distinguish.
/// Each maps to exactly one HTTP status at the API boundary.
#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cache store error: {0}")]
    Cache(String),

    #[error("data store error: {0}")]
    Data(String),

    #[error("unknown fallback recommender: {0}")]
    UnknownFallback(String),

    #[error("write-back failed: {0}")]
    WriteBack(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RecommendError {
    /// True for the subset of errors that map to a 500 at the API boundary.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RecommendError::Cache(_)
                | RecommendError::Data(_)
                | RecommendError::UnknownFallback(_)
                | RecommendError::WriteBack(_)
                | RecommendError::Serialization(_)
                | RecommendError::Internal(_)
        )
    }
}
