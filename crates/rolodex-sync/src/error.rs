use rolodex_core::CoreError;
use rolodex_store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("failed to decode file: {0}")]
    Decode(String),
    #[error("directory request failed: {0}")]
    Remote(String),
    #[cfg(feature = "directory-sync")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
