//! The invoking user as the dispatcher sees them.

/// Who is asking to run a command.
///
/// `guild` is `None` for direct messages; permission nodes are only
/// evaluated inside a guild.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub roles: Vec<String>,
    pub guild: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
            guild: None,
        }
    }

    /// Place the actor in a guild.
    pub fn in_guild(mut self, guild: impl Into<String>) -> Self {
        self.guild = Some(guild.into());
        self
    }

    /// Attach the actor's role ids.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}
