use crate::config::ConfigError;
use crate::orchestration::IndexerError;
use crate::store::StoreError;
use thiserror::Error;

/// Top-level failure of the indexer binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),
}

impl AppError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            _ => 1,
        }
    }
}
