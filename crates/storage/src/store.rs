//! SQLite permission set store implementation.

use crate::{Error, Result, SetRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed permission set store.
pub struct SetStore {
    conn: Connection,
}

impl SetStore {
    /// Open or create a set store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory set store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS permission_sets (
                guild TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (guild, name)
            );
            "#,
        )?;
        Ok(())
    }

    /// Create an empty named set, failing if the name is taken.
    pub fn create(&self, guild: &str, name: &str) -> Result<SetRecord> {
        let record = SetRecord::new(guild, name);
        let changed = self.conn.execute(
            "INSERT INTO permission_sets (guild, name, created_at, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (guild, name) DO NOTHING",
            params![
                record.guild,
                record.name,
                record.created_at.to_rfc3339(),
                serde_json::to_string(&record.set)?,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NameTaken(name.to_string()));
        }
        Ok(record)
    }

    /// Write a record, replacing any existing set with the same name.
    pub fn save(&self, record: &SetRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO permission_sets (guild, name, created_at, data)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.guild,
                record.name,
                record.created_at.to_rfc3339(),
                serde_json::to_string(&record.set)?,
            ],
        )?;
        Ok(())
    }

    /// Load a named set.
    pub fn get(&self, guild: &str, name: &str) -> Result<SetRecord> {
        let row = self
            .conn
            .query_row(
                "SELECT created_at, data FROM permission_sets WHERE guild = ?1 AND name = ?2",
                params![guild, name],
                |row| {
                    let created_at: String = row.get(0)?;
                    let data: String = row.get(1)?;
                    Ok((created_at, data))
                },
            )
            .optional()?;

        let Some((created_at, data)) = row else {
            return Err(Error::NotFound(name.to_string()));
        };

        Ok(SetRecord {
            guild: guild.to_string(),
            name: name.to_string(),
            created_at: created_at.parse()?,
            set: serde_json::from_str(&data)?,
        })
    }

    /// Delete a named set.
    pub fn remove(&self, guild: &str, name: &str) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM permission_sets WHERE guild = ?1 AND name = ?2",
            params![guild, name],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(name.to_string()));
        }
        Ok(())
    }

    /// List all sets in a guild, ordered by name.
    pub fn list(&self, guild: &str) -> Result<Vec<SetRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, created_at, data FROM permission_sets
             WHERE guild = ?1 ORDER BY name",
        )?;

        let records = stmt
            .query_map([guild], |row| {
                let name: String = row.get(0)?;
                let created_at: String = row.get(1)?;
                let data: String = row.get(2)?;
                Ok((name, created_at, data))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(name, created_at, data)| {
                Some(SetRecord {
                    guild: guild.to_string(),
                    name,
                    created_at: created_at.parse().ok()?,
                    set: serde_json::from_str(&data).ok()?,
                })
            })
            .collect();

        Ok(records)
    }

    /// Find the sets in a guild that apply to a member holding the given roles.
    pub fn find_applicable(
        &self,
        guild: &str,
        member: &str,
        roles: &[String],
    ) -> Result<Vec<SetRecord>> {
        let records = self
            .list(guild)?
            .into_iter()
            .filter(|record| record.set.applies_to(member, roles))
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions::TargetKind;

    #[test]
    fn test_create_and_get_round_trip() {
        let store = SetStore::in_memory().unwrap();
        let mut record = store.create("g1", "mods").unwrap();
        record.set.add_targets(TargetKind::Role, ["mod-role"]);
        record.set.grant("messages.*");
        record.set.negate("messages.purge");
        store.save(&record).unwrap();

        let loaded = store.get("g1", "mods").unwrap();
        assert_eq!(loaded.guild, "g1");
        assert_eq!(loaded.name, "mods");
        assert_eq!(loaded.set.roles, ["mod-role"]);
        assert_eq!(loaded.set.granted, ["messages.*"]);
        assert_eq!(loaded.set.negated, ["messages.purge"]);
    }

    #[test]
    fn test_create_duplicate_name() {
        let store = SetStore::in_memory().unwrap();
        store.create("g1", "mods").unwrap();
        let err = store.create("g1", "mods").unwrap_err();
        assert!(matches!(err, Error::NameTaken(name) if name == "mods"));

        // Same name in another guild is fine.
        store.create("g2", "mods").unwrap();
    }

    #[test]
    fn test_get_missing() {
        let store = SetStore::in_memory().unwrap();
        let err = store.get("g1", "absent").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_remove() {
        let store = SetStore::in_memory().unwrap();
        store.create("g1", "mods").unwrap();
        store.remove("g1", "mods").unwrap();
        assert!(matches!(
            store.remove("g1", "mods").unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(store.get("g1", "mods").is_err());
    }

    #[test]
    fn test_list_ordered_by_name() {
        let store = SetStore::in_memory().unwrap();
        store.create("g1", "b").unwrap();
        store.create("g1", "a").unwrap();
        store.create("g2", "other").unwrap();

        let names: Vec<_> = store
            .list("g1")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_list_skips_rows_that_fail_to_decode() {
        let store = SetStore::in_memory().unwrap();
        store.create("g1", "good").unwrap();

        // save() can never write rows like these, so plant them directly.
        store
            .conn
            .execute_batch(
                "INSERT INTO permission_sets (guild, name, created_at, data)
                 VALUES ('g1', 'mangled', 'not-a-timestamp', '{}');
                 INSERT INTO permission_sets (guild, name, created_at, data)
                 VALUES ('g1', 'garbled', '2024-01-01T00:00:00Z', 'not-json');",
            )
            .unwrap();

        let names: Vec<_> = store
            .list("g1")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["good"]);

        // get reads a single row strictly instead of skipping it.
        assert!(matches!(
            store.get("g1", "mangled").unwrap_err(),
            Error::Timestamp(_)
        ));
        assert!(matches!(
            store.get("g1", "garbled").unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn test_find_applicable() {
        let store = SetStore::in_memory().unwrap();
        let mut by_role = store.create("g1", "by-role").unwrap();
        by_role.set.add_targets(TargetKind::Role, ["mods"]);
        store.save(&by_role).unwrap();

        let mut by_member = store.create("g1", "by-member").unwrap();
        by_member.set.add_targets(TargetKind::Member, ["100"]);
        store.save(&by_member).unwrap();

        store.create("g1", "unattached").unwrap();

        let roles = ["mods".to_string()];
        let hits = store.find_applicable("g1", "999", &roles).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "by-role");

        let hits = store.find_applicable("g1", "100", &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "by-member");

        assert!(store.find_applicable("g1", "999", &[]).unwrap().is_empty());
    }
}
