use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Mod not found: {0}")]
    ModNotFound(i64),

    #[error("Mod version not found: {0}")]
    ModVersionNotFound(i64),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Mod not found: {0}")]
    NotFound(i64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Empty version constraint")]
    Empty,

    #[error("Invalid version requirement: {0}")]
    InvalidRequirement(String),
}
