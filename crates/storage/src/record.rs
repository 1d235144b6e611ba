//! Persisted permission set records.

use chrono::{DateTime, Utc};
use permissions::PermissionSet;

/// A named permission set stored for one guild.
///
/// Names are unique within a guild; the same name may exist in several
/// guilds independently.
#[derive(Debug, Clone)]
pub struct SetRecord {
    pub guild: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub set: PermissionSet,
}

impl SetRecord {
    pub fn new(guild: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guild: guild.into(),
            name: name.into(),
            created_at: Utc::now(),
            set: PermissionSet::new(),
        }
    }
}
