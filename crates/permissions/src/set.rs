//! Permission sets: granted/negated node collections with target lists.

use crate::node::nodes_satisfy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A collection of granted and negated permission nodes, applied to the
/// roles and members listed as its targets.
///
/// Evaluation is default-deny: a node with no covering grant is refused.
/// A negation never grants anything on its own; it carves exceptions out
/// of broader (usually wildcard) grants and wins over any grant covering
/// the same node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Role ids this set applies to.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Member ids this set applies to.
    #[serde(default)]
    pub members: Vec<String>,

    /// Nodes this set grants.
    #[serde(default)]
    pub granted: Vec<String>,

    /// Nodes this set negates (overriding grants).
    #[serde(default)]
    pub negated: Vec<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a node, removing any negation of it.
    ///
    /// Empty nodes are ignored. After this returns the node sits in
    /// `granted` only.
    pub fn grant(&mut self, node: &str) {
        if node.is_empty() {
            return;
        }
        remove_entry(&mut self.negated, node);
        push_unique(&mut self.granted, node.to_string());
    }

    /// Negate a node, removing any grant of it.
    ///
    /// Empty nodes are ignored. After this returns the node sits in
    /// `negated` only.
    pub fn negate(&mut self, node: &str) {
        if node.is_empty() {
            return;
        }
        remove_entry(&mut self.granted, node);
        push_unique(&mut self.negated, node.to_string());
    }

    /// Remove a node from both collections.
    pub fn reset(&mut self, node: &str) {
        remove_entry(&mut self.granted, node);
        remove_entry(&mut self.negated, node);
    }

    /// Add target ids of the given kind, skipping empty ids and duplicates.
    pub fn add_targets<I, S>(&mut self, kind: TargetKind, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = self.targets_mut(kind);
        for id in ids {
            let id = id.into();
            if id.is_empty() {
                continue;
            }
            push_unique(targets, id);
        }
    }

    /// Remove target ids of the given kind.
    pub fn del_targets<I, S>(&mut self, kind: TargetKind, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = self.targets_mut(kind);
        for id in ids {
            remove_entry(targets, id.as_ref());
        }
    }

    fn targets_mut(&mut self, kind: TargetKind) -> &mut Vec<String> {
        match kind {
            TargetKind::Role => &mut self.roles,
            TargetKind::Member => &mut self.members,
        }
    }

    /// Whether this set applies to a member holding the given roles.
    pub fn applies_to(&self, member: &str, roles: &[String]) -> bool {
        self.members.iter().any(|m| m == member)
            || self.roles.iter().any(|held| roles.contains(held))
    }

    /// Union-merge several sets into one.
    ///
    /// Grants and negations are each deduplicated; the merged membership
    /// does not depend on input order. Targets are not carried over, since
    /// a composite is an evaluation value and is never persisted.
    pub fn composite<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a PermissionSet>,
    {
        let mut merged = Self::new();
        for set in sets {
            for node in &set.granted {
                push_unique(&mut merged.granted, node.clone());
            }
            for node in &set.negated {
                push_unique(&mut merged.negated, node.clone());
            }
        }
        merged
    }

    /// Whether this set authorizes a node.
    ///
    /// Some grant must cover the node, and no negation may cover it.
    pub fn allows(&self, node: &str) -> bool {
        if !self.granted.iter().any(|held| nodes_satisfy(node, held)) {
            return false;
        }
        !self.negated.iter().any(|held| nodes_satisfy(node, held))
    }
}

/// Which target list a set operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Role,
    Member,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Role => write!(f, "role"),
            TargetKind::Member => write!(f, "member"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "role" | "roles" => Ok(TargetKind::Role),
            "member" | "members" => Ok(TargetKind::Member),
            other => Err(Error::UnknownTargetKind(other.to_string())),
        }
    }
}

fn push_unique(list: &mut Vec<String>, entry: String) {
    if !list.contains(&entry) {
        list.push(entry);
    }
}

fn remove_entry(list: &mut Vec<String>, entry: &str) {
    list.retain(|e| e != entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_then_negate_moves_node() {
        let mut set = PermissionSet::new();
        set.grant("x.y");
        set.negate("x.y");
        assert!(set.granted.is_empty());
        assert_eq!(set.negated, ["x.y"]);
    }

    #[test]
    fn test_negate_then_grant_moves_node() {
        let mut set = PermissionSet::new();
        set.negate("x.y");
        set.grant("x.y");
        assert_eq!(set.granted, ["x.y"]);
        assert!(set.negated.is_empty());
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut set = PermissionSet::new();
        set.grant("a.b");
        set.grant("a.b");
        assert_eq!(set.granted, ["a.b"]);
    }

    #[test]
    fn test_empty_node_is_ignored() {
        let mut set = PermissionSet::new();
        set.grant("");
        set.negate("");
        assert!(set.granted.is_empty());
        assert!(set.negated.is_empty());
    }

    #[test]
    fn test_reset_clears_both() {
        let mut set = PermissionSet::new();
        set.grant("a");
        set.negate("b");
        set.reset("a");
        set.reset("b");
        set.reset("absent");
        assert!(set.granted.is_empty());
        assert!(set.negated.is_empty());
    }

    #[test]
    fn test_add_targets_skips_empty_and_duplicates() {
        let mut set = PermissionSet::new();
        set.add_targets(TargetKind::Role, ["mods", "", "mods", "admins"]);
        assert_eq!(set.roles, ["mods", "admins"]);
        assert!(set.members.is_empty());
    }

    #[test]
    fn test_del_targets() {
        let mut set = PermissionSet::new();
        set.add_targets(TargetKind::Member, ["100", "200"]);
        set.del_targets(TargetKind::Member, ["100", "absent"]);
        assert_eq!(set.members, ["200"]);
    }

    #[test]
    fn test_applies_to() {
        let mut set = PermissionSet::new();
        set.add_targets(TargetKind::Role, ["mods"]);
        set.add_targets(TargetKind::Member, ["100"]);

        assert!(set.applies_to("100", &[]));
        assert!(set.applies_to("999", &["mods".to_string()]));
        assert!(!set.applies_to("999", &["admins".to_string()]));
    }

    #[test]
    fn test_composite_unions_once_each() {
        let mut a = PermissionSet::new();
        a.grant("a");
        a.grant("shared");
        let mut b = PermissionSet::new();
        b.grant("b");
        b.grant("shared");

        let ab = PermissionSet::composite([&a, &b]);
        let ba = PermissionSet::composite([&b, &a]);
        assert_eq!(ab.granted, ["a", "shared", "b"]);
        assert_eq!(ba.granted, ["b", "shared", "a"]);
        for node in ["a", "b", "shared"] {
            assert!(ab.allows(node));
            assert!(ba.allows(node));
        }
    }

    #[test]
    fn test_composite_drops_targets() {
        let mut a = PermissionSet::new();
        a.add_targets(TargetKind::Role, ["mods"]);
        a.grant("x");

        let merged = PermissionSet::composite([&a]);
        assert!(merged.roles.is_empty());
        assert!(merged.members.is_empty());
        assert_eq!(merged.granted, ["x"]);
    }

    #[test]
    fn test_negation_wins_across_sets() {
        let mut a = PermissionSet::new();
        a.grant("perm.x");
        let mut b = PermissionSet::new();
        b.negate("perm.x");

        assert!(!PermissionSet::composite([&a, &b]).allows("perm.x"));
        assert!(!PermissionSet::composite([&b, &a]).allows("perm.x"));
    }

    #[test]
    fn test_empty_set_denies() {
        let set = PermissionSet::new();
        assert!(!set.allows("anything"));
        assert!(!set.allows("a.b.c"));
    }

    #[test]
    fn test_negation_without_grant_is_inert() {
        let mut set = PermissionSet::new();
        set.negate("a.b");
        assert!(!set.allows("a.b"));
        assert!(!set.allows("a.c"));
    }

    #[test]
    fn test_wildcard_grant_with_specific_negation() {
        let mut a = PermissionSet::new();
        a.grant("admin.*");
        let mut b = PermissionSet::new();
        b.negate("admin.delete");

        let merged = PermissionSet::composite([&a, &b]);
        assert!(!merged.allows("admin.delete"));
        assert!(merged.allows("admin.edit"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut set = PermissionSet::new();
        set.add_targets(TargetKind::Role, ["mods"]);
        set.grant("messages.*");
        set.negate("messages.purge");

        let json = serde_json::to_string(&set).unwrap();
        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.roles, set.roles);
        assert_eq!(back.granted, set.granted);
        assert_eq!(back.negated, set.negated);
    }

    #[test]
    fn test_deserialize_missing_fields_default() {
        let set: PermissionSet = serde_json::from_str("{}").unwrap();
        assert!(set.granted.is_empty());
        assert!(set.negated.is_empty());
        assert!(set.roles.is_empty());
        assert!(set.members.is_empty());
    }

    #[test]
    fn test_target_kind_parsing() {
        assert_eq!("role".parse::<TargetKind>().unwrap(), TargetKind::Role);
        assert_eq!("members".parse::<TargetKind>().unwrap(), TargetKind::Member);
        assert!("group".parse::<TargetKind>().is_err());
        assert_eq!(TargetKind::Role.to_string(), "role");
        assert_eq!(TargetKind::Member.to_string(), "member");
    }
}
