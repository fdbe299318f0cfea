use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document is not a JSON object")]
    NotAnObject,

    #[error("Filter is not a JSON object")]
    InvalidFilter,
}
