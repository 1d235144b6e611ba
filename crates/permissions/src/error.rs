//! Permission error types.

use thiserror::Error;

/// Permission errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A target kind string was not recognized.
    #[error("unknown target kind '{0}', expected 'role' or 'member'")]
    UnknownTargetKind(String),
}

pub type Result<T> = std::result::Result<T, Error>;
