//! SQLite-backed storage for Steward permission sets.
//!
//! This crate persists the named permission sets administrators build up per
//! guild: which nodes each set grants or negates, and which roles and members
//! it applies to. The dispatch layer reads these records back every time a
//! guarded command runs.
//!
//! # Overview
//!
//! The storage layer serves two purposes:
//!
//! 1. **Durability** — Sets survive restarts; a guild's permission layout is
//!    data, not configuration baked into the bot.
//!
//! 2. **Resolution** — Answer "which sets apply to this member?" so the
//!    dispatcher can composite them and evaluate a node.
//!
//! # Core Concepts
//!
//! ## SetStore
//!
//! The [`SetStore`] is the primary interface for persistence. It wraps a
//! SQLite database keyed by `(guild, name)` and provides create, save, get,
//! list, and remove operations plus the applicability query.
//!
//! ## SetRecord
//!
//! A [`SetRecord`] is one named set in one guild. Each record has:
//! - The guild that owns it
//! - A name, unique within the guild
//! - A creation timestamp
//! - The [`permissions::PermissionSet`] itself, stored as JSON
//!
//! # Example
//!
//! ```no_run
//! use permissions::TargetKind;
//! use storage::SetStore;
//!
//! // Open or create the set store
//! let store = SetStore::open("sets.db")?;
//!
//! // Build a set for the guild's moderators
//! let mut record = store.create("guild-1", "mods")?;
//! record.set.add_targets(TargetKind::Role, ["mod-role"]);
//! record.set.grant("messages.*");
//! record.set.negate("messages.purge");
//! store.save(&record)?;
//!
//! // Resolve the sets applying to one member
//! let roles = vec!["mod-role".to_string()];
//! for record in store.find_applicable("guild-1", "member-1", &roles)? {
//!     println!("{}: {} grants", record.name, record.set.granted.len());
//! }
//! # Ok::<(), storage::Error>(())
//! ```
//!
//! # Re-exports
//!
//! This crate re-exports all public types at the crate root for convenience:
//!
//! - [`SetStore`] — Storage interface
//! - [`SetRecord`] — Record type
//! - [`Error`], [`Result`] — Error handling

mod error;
mod record;
mod store;

pub use error::{Error, Result};
pub use record::SetRecord;
pub use store::SetStore;
