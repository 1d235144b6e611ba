//! The authorization gate in front of every command.

use crate::{AccessLevel, Actor, Command, Error, Result};
use permissions::PermissionSet;
use serde::{Deserialize, Serialize};
use std::future::Future;
use storage::SetStore;
use tracing::{debug, warn};

/// Bot-wide authorization configuration.
///
/// Immutable once handed to a [`Gate`]; loaded from the host's config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Member ids with unconditional access everywhere.
    #[serde(default)]
    pub owners: Vec<String>,

    /// Role ids conferring [`AccessLevel::Moderator`].
    #[serde(default)]
    pub moderator_roles: Vec<String>,

    /// Role ids conferring [`AccessLevel::Admin`].
    #[serde(default)]
    pub admin_roles: Vec<String>,
}

/// Result of an authorization check.
#[derive(Debug, Clone)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Source of the permission sets applying to an actor.
///
/// Futures are not required to be `Send`: the SQLite-backed provider borrows
/// a connection that is not `Sync`.
pub trait SetProvider {
    /// Fetch the sets applying to a member with the given roles.
    fn applicable_sets(
        &self,
        guild: &str,
        member: &str,
        roles: &[String],
    ) -> impl Future<Output = Result<Vec<PermissionSet>>>;
}

impl SetProvider for SetStore {
    async fn applicable_sets(
        &self,
        guild: &str,
        member: &str,
        roles: &[String],
    ) -> Result<Vec<PermissionSet>> {
        let records = self.find_applicable(guild, member, roles)?;
        Ok(records.into_iter().map(|record| record.set).collect())
    }
}

/// The access-control decision point consumed by the command dispatcher.
pub struct Gate {
    config: GateConfig,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Whether the actor is a configured owner.
    pub fn is_owner(&self, actor: &Actor) -> bool {
        self.config.owners.contains(&actor.id)
    }

    /// The actor's access level under this gate's configuration.
    ///
    /// Owners are root everywhere. Role-derived levels exist only inside a
    /// guild; a direct message yields `Everyone` for anyone else.
    pub fn access_level(&self, actor: &Actor) -> AccessLevel {
        if self.is_owner(actor) {
            return AccessLevel::Root;
        }
        if actor.guild.is_none() {
            return AccessLevel::Everyone;
        }
        if has_any(&actor.roles, &self.config.admin_roles) {
            AccessLevel::Admin
        } else if has_any(&actor.roles, &self.config.moderator_roles) {
            AccessLevel::Moderator
        } else {
            AccessLevel::Everyone
        }
    }

    /// Check the command's required access level.
    pub fn check_level(&self, actor: &Actor, command: &Command) -> Decision {
        let held = self.access_level(actor);
        if held >= command.level {
            Decision::Allow
        } else {
            Decision::Deny {
                reason: format!("requires {} access, you have {held}", command.level),
            }
        }
    }

    /// Evaluate the command's permission node against already-fetched sets.
    ///
    /// Owners bypass the node check; commands without a node pass; outside
    /// a guild node checks always deny.
    pub fn check_node(
        &self,
        actor: &Actor,
        command: &Command,
        sets: &[PermissionSet],
    ) -> Decision {
        match self.screen_node(actor, command) {
            NodeScreen::Done(decision) => decision,
            NodeScreen::Check { node, .. } => node_decision(node, sets),
        }
    }

    /// Level check, then node check.
    pub fn check(&self, actor: &Actor, command: &Command, sets: &[PermissionSet]) -> Decision {
        if let deny @ Decision::Deny { .. } = self.check_level(actor, command) {
            return deny;
        }
        self.check_node(actor, command, sets)
    }

    /// Like [`check`](Self::check), but mapping a denial into an error.
    pub fn require(&self, actor: &Actor, command: &Command, sets: &[PermissionSet]) -> Result<()> {
        match self.check(actor, command, sets) {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => Err(Error::Denied(reason)),
        }
    }

    /// Full check, fetching the actor's sets through a provider.
    ///
    /// With no provider configured the node check is skipped with a warning
    /// rather than failing closed, so a host can run without an
    /// authorization backend. Level checks still apply.
    pub async fn check_via<P>(
        &self,
        provider: Option<&P>,
        actor: &Actor,
        command: &Command,
    ) -> Result<Decision>
    where
        P: SetProvider,
    {
        if let deny @ Decision::Deny { .. } = self.check_level(actor, command) {
            return Ok(deny);
        }

        match self.screen_node(actor, command) {
            NodeScreen::Done(decision) => Ok(decision),
            NodeScreen::Check { node, guild } => {
                let Some(provider) = provider else {
                    warn!(
                        command = %command.name,
                        "no permission set store configured, skipping node check"
                    );
                    return Ok(Decision::Allow);
                };
                let sets = provider
                    .applicable_sets(guild, &actor.id, &actor.roles)
                    .await?;
                debug!(
                    command = %command.name,
                    node,
                    sets = sets.len(),
                    "evaluating permission node"
                );
                Ok(node_decision(node, &sets))
            }
        }
    }

    fn screen_node<'a>(&self, actor: &'a Actor, command: &'a Command) -> NodeScreen<'a> {
        if self.is_owner(actor) {
            return NodeScreen::Done(Decision::Allow);
        }
        let Some(node) = command.node.as_deref() else {
            return NodeScreen::Done(Decision::Allow);
        };
        match actor.guild.as_deref() {
            Some(guild) => NodeScreen::Check { node, guild },
            None => NodeScreen::Done(Decision::Deny {
                reason: format!("'{}' can only be used in a guild", command.name),
            }),
        }
    }
}

/// Outcome of the short-circuit screening before a node lookup.
enum NodeScreen<'a> {
    Done(Decision),
    Check { node: &'a str, guild: &'a str },
}

fn node_decision(node: &str, sets: &[PermissionSet]) -> Decision {
    if PermissionSet::composite(sets).allows(node) {
        Decision::Allow
    } else {
        Decision::Deny {
            reason: format!("missing permission '{node}'"),
        }
    }
}

fn has_any(held: &[String], wanted: &[String]) -> bool {
    held.iter().any(|role| wanted.contains(role))
}
