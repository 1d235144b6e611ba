use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("no permission set named '{0}'")]
    NotFound(String),

    #[error("a permission set named '{0}' already exists")]
    NameTaken(String),
}

pub type Result<T> = std::result::Result<T, Error>;
