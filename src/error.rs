use crate::catalog::LookupError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiaryError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("TMDb credentials are not set. Export TMDB_BEARER or TMDB_API_KEY, or run `diary config --set-bearer TOKEN`")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a Letterboxd CSV export: {0}")]
    InvalidImportFile(String),

    #[error("Diary entry not found: #{0}")]
    EntryNotFound(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] LookupError),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] media_diary_common::Error),
}

pub type Result<T> = std::result::Result<T, DiaryError>;

impl From<StoreError> for DiaryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DiaryError::EntryNotFound(id),
            other => DiaryError::Store(other),
        }
    }
}
