use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied: {0}")]
    Denied(String),

    #[error("unknown access level: {0}")]
    UnknownLevel(String),

    #[error(transparent)]
    Storage(#[from] storage::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
