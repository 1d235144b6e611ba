//! Access levels for command gating.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad access tiers checked before any permission node.
///
/// Levels are ordered; holding a level satisfies every requirement at or
/// below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Everyone,
    Moderator,
    Admin,
    Root,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessLevel::Everyone => "everyone",
            AccessLevel::Moderator => "moderator",
            AccessLevel::Admin => "admin",
            AccessLevel::Root => "root",
        };
        write!(f, "{name}")
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "everyone" => Ok(AccessLevel::Everyone),
            "moderator" => Ok(AccessLevel::Moderator),
            "admin" => Ok(AccessLevel::Admin),
            "root" => Ok(AccessLevel::Root),
            other => Err(Error::UnknownLevel(other.to_string())),
        }
    }
}
