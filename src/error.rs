use thiserror::Error;

/// Failures reported by a `LocationStore`
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("location not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Failures reported by the location form on submit
#[derive(Debug, Error)]
pub enum FormError {
    #[error("location name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Store(#[from] StoreError),
}
