use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("dimension mismatch: index dimension is {expected}, vector has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt index: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid index parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
