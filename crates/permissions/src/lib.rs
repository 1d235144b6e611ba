//! Hierarchical permission nodes for Steward's command dispatch.
//!
//! This crate is the authorization core: dotted permission nodes
//! (`messages.purge`, `perm.manage.roles`), wildcard matching, and
//! grant/negate sets resolved across an actor's roles and memberships.
//!
//! # Core Concepts
//!
//! ## Nodes
//!
//! A permission node is a dot-separated path naming one action. A grant of
//! `messages.*` covers every node under `messages`; the bare wildcard `*`
//! covers everything. Matching is wildcard-or-exact: holding `a.b` says
//! nothing about `a.b.c` (see [`nodes_satisfy`]).
//!
//! ## Permission Sets
//!
//! A [`PermissionSet`] holds granted nodes, negated nodes, and the role and
//! member ids it applies to. Granting a node withdraws its negation and vice
//! versa, so one set never both grants and negates the same node.
//!
//! ## Composites
//!
//! An actor usually matches several sets (one per role, plus direct
//! membership). [`PermissionSet::composite`] unions them, and
//! [`PermissionSet::allows`] evaluates a node with deny-by-default and
//! negation overriding any grant, no matter which source set contributed it.
//!
//! # Example
//!
//! ```
//! use permissions::{PermissionSet, TargetKind};
//!
//! let mut admins = PermissionSet::new();
//! admins.add_targets(TargetKind::Role, ["admin"]);
//! admins.grant("admin.*");
//!
//! let mut trainees = PermissionSet::new();
//! trainees.add_targets(TargetKind::Member, ["204"]);
//! trainees.negate("admin.delete");
//!
//! // Member 204 holds the admin role, so both sets apply: the wildcard
//! // grant covers everything under admin, minus the carved-out deletion.
//! let merged = PermissionSet::composite([&admins, &trainees]);
//! assert!(merged.allows("admin.edit"));
//! assert!(!merged.allows("admin.delete"));
//! ```
//!
//! # Re-exports
//!
//! - [`PermissionSet`], [`TargetKind`] — set type and target addressing
//! - [`nodes_satisfy`], [`prefixes`] — node algebra
//! - [`Error`], [`Result`] — error handling

mod error;
mod node;
mod set;

pub use error::{Error, Result};
pub use node::{nodes_satisfy, prefixes};
pub use set::{PermissionSet, TargetKind};
