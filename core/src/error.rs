use thiserror::Error;

/// Failures surfaced by the pantry service layer.
///
/// Store failures are wrapped as-is so callers can log the full chain; the
/// other variants carry a message meant to be shown to the client verbatim.
#[derive(Debug, Error)]
pub enum PantryError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl PantryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type PantryResult<T> = std::result::Result<T, PantryError>;
