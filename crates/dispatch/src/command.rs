//! Command metadata read by the gate.

use crate::AccessLevel;

/// What the dispatcher knows about a command when gating it.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub node: Option<String>,
    pub level: AccessLevel,
}

impl Command {
    /// Create a command open to everyone, requiring no permission node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: None,
            level: AccessLevel::Everyone,
        }
    }

    /// Require a permission node.
    pub fn node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Require an access level.
    pub fn level(mut self, level: AccessLevel) -> Self {
        self.level = level;
        self
    }
}
