use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaleOpsError {
    #[error("not initialized: run 'scaleops init'")]
    NotInitialized,

    #[error("invalid item id '{0}': must be lowercase alphanumeric with '-' or '_'")]
    InvalidItemId(String),

    #[error("invalid tab: {0}")]
    InvalidTab(String),

    #[error("invalid export format: {0}")]
    InvalidFormat(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Quota exhaustion or a record that could not be encoded. The write is dropped.
    #[error("storage error: {0}")]
    Storage(String),

    /// Remote mirror or render service unreachable.
    #[error("network error: {0}")]
    Network(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("renderer unavailable: {0}")]
    LibraryUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScaleOpsError {
    /// True for failures that leave the workflow usable in local-only mode.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            ScaleOpsError::Storage(_)
                | ScaleOpsError::Network(_)
                | ScaleOpsError::LibraryUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScaleOpsError>;
