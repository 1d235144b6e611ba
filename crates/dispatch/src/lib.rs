//! Steward dispatch — access levels and the authorization gate.
//!
//! This crate decides whether an actor may run a command. Two checks are
//! combined:
//!
//! - **Access level**: broad tiers (everyone, moderator, admin, root)
//!   derived from the gate's configured owner and role lists.
//! - **Permission node**: the command's required node evaluated against the
//!   permission sets applying to the actor, fetched through a
//!   [`SetProvider`].
//!
//! Owners pass every check. Commands without a required node only face the
//! level check. Node checks are guild-only; in a direct message they deny.
//!
//! # Example
//!
//! ```
//! use dispatch::{AccessLevel, Actor, Command, Gate, GateConfig};
//!
//! let gate = Gate::new(GateConfig {
//!     owners: vec!["owner-1".to_string()],
//!     ..GateConfig::default()
//! });
//!
//! let actor = Actor::new("owner-1");
//! let command = Command::new("shutdown").level(AccessLevel::Root);
//! assert!(gate.check_level(&actor, &command).is_allowed());
//! ```

mod access;
mod actor;
mod command;
mod error;
mod gate;

pub use access::AccessLevel;
pub use actor::Actor;
pub use command::Command;
pub use error::{Error, Result};
pub use gate::{Decision, Gate, GateConfig, SetProvider};
