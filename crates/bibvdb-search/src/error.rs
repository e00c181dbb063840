use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Core(#[from] bibvdb_core::Error),

    #[error(transparent)]
    Index(#[from] bibvdb_index::IndexError),

    #[error("corrupt index: {0}")]
    IndexCorrupt(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
