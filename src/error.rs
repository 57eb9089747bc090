use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Process exit status for this error. Zero is reserved for success.
    pub fn error_code(&self) -> i32 {
        match self {
            Error::Io(_) => 1,
            Error::Storage(_) => 2,
            Error::Serialization(_) => 3,
            Error::Config(_) => 4,
        }
    }
}
