mod config;
mod error;

use std::path::PathBuf;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use dispatch::{AccessLevel, Actor, Command, Decision, Gate};
use permissions::{prefixes, TargetKind};
use storage::SetStore;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "steward.toml";
const DB_FILE: &str = "sets.db";

#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "Permission sets and command gating for Steward guilds", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty permission set
    Create {
        /// Guild the set belongs to
        #[arg(short, long)]
        guild: String,
        /// Set name, unique within the guild
        name: String,
    },
    /// Delete a permission set
    Delete {
        #[arg(short, long)]
        guild: String,
        name: String,
    },
    /// List the permission sets in a guild
    List {
        #[arg(short, long)]
        guild: String,
    },
    /// Show one permission set in full
    Show {
        #[arg(short, long)]
        guild: String,
        name: String,
    },
    /// Grant a permission node to a set
    Grant {
        #[arg(short, long)]
        guild: String,
        name: String,
        node: String,
    },
    /// Negate a permission node in a set
    Negate {
        #[arg(short, long)]
        guild: String,
        name: String,
        node: String,
    },
    /// Remove a node from both sides of a set
    Reset {
        #[arg(short, long)]
        guild: String,
        name: String,
        node: String,
    },
    /// Add role or member targets to a set
    AddTarget {
        #[arg(short, long)]
        guild: String,
        name: String,
        /// Target kind: role or member
        kind: String,
        /// Ids to add
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove role or member targets from a set
    DelTarget {
        #[arg(short, long)]
        guild: String,
        name: String,
        /// Target kind: role or member
        kind: String,
        /// Ids to remove
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Evaluate the gate for a hypothetical actor
    Check {
        /// Member id to check
        #[arg(short, long)]
        member: String,
        /// Guild context; omit to simulate a direct message
        #[arg(short, long)]
        guild: Option<String>,
        /// Comma-separated role ids held by the member
        #[arg(short, long, value_delimiter = ',')]
        roles: Vec<String>,
        /// Required access level (everyone, moderator, admin, root)
        #[arg(short, long)]
        level: Option<String>,
        /// Permission node to evaluate
        node: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    match cli.command {
        Commands::Create { guild, name } => cmd_create(&config, &guild, &name),
        Commands::Delete { guild, name } => cmd_delete(&config, &guild, &name),
        Commands::List { guild } => cmd_list(&config, &guild),
        Commands::Show { guild, name } => cmd_show(&config, &guild, &name),
        Commands::Grant { guild, name, node } => cmd_grant(&config, &guild, &name, &node),
        Commands::Negate { guild, name, node } => cmd_negate(&config, &guild, &name, &node),
        Commands::Reset { guild, name, node } => cmd_reset(&config, &guild, &name, &node),
        Commands::AddTarget {
            guild,
            name,
            kind,
            ids,
        } => cmd_edit_targets(&config, &guild, &name, &kind, ids, TargetEdit::Add),
        Commands::DelTarget {
            guild,
            name,
            kind,
            ids,
        } => cmd_edit_targets(&config, &guild, &name, &kind, ids, TargetEdit::Del),
        Commands::Check {
            member,
            guild,
            roles,
            level,
            node,
        } => {
            cmd_check(
                &config,
                &member,
                guild.as_deref(),
                roles,
                level.as_deref(),
                node.as_deref(),
            )
            .await
        }
    }
}

fn cmd_create(config: &Config, guild: &str, name: &str) -> Result<()> {
    let path = db_path(config);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SetStore::open(&path)?;
    let record = store.create(guild, name)?;

    println!("Created set '{}' in guild {}.", record.name, record.guild);
    println!("Stored at: {}", path.display());
    Ok(())
}

fn cmd_delete(config: &Config, guild: &str, name: &str) -> Result<()> {
    let store = open_store(config)?;
    store.remove(guild, name)?;
    println!("Deleted set '{name}' from guild {guild}.");
    Ok(())
}

fn cmd_list(config: &Config, guild: &str) -> Result<()> {
    let store = open_store(config)?;
    let records = store.list(guild)?;

    if records.is_empty() {
        println!("No permission sets in guild {guild}.");
        return Ok(());
    }

    println!(
        "{:<20}  {:<16}  {:<8}  {:<8}  TARGETS",
        "NAME", "CREATED", "GRANTS", "NEGATED"
    );
    println!("{}", "-".repeat(72));

    for record in records {
        let created = Local
            .from_utc_datetime(&record.created_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        let targets = record.set.roles.len() + record.set.members.len();
        println!(
            "{:<20}  {created}  {:<8}  {:<8}  {targets}",
            record.name,
            record.set.granted.len(),
            record.set.negated.len(),
        );
    }

    Ok(())
}

fn cmd_show(config: &Config, guild: &str, name: &str) -> Result<()> {
    let store = open_store(config)?;
    let record = store.get(guild, name)?;

    let created = Local
        .from_utc_datetime(&record.created_at.naive_utc())
        .format("%Y-%m-%d %H:%M");
    println!("Set:     {}", record.name);
    println!("Guild:   {}", record.guild);
    println!("Created: {created}");
    println!("Roles:   {}", join_or_dash(&record.set.roles));
    println!("Members: {}", join_or_dash(&record.set.members));
    println!("Granted: {}", join_or_dash(&record.set.granted));
    println!("Negated: {}", join_or_dash(&record.set.negated));
    Ok(())
}

fn cmd_grant(config: &Config, guild: &str, name: &str, node: &str) -> Result<()> {
    let store = open_store(config)?;
    let mut record = store.get(guild, name)?;
    record.set.grant(node);
    store.save(&record)?;
    println!("Granted '{node}' in set '{name}'.");
    Ok(())
}

fn cmd_negate(config: &Config, guild: &str, name: &str, node: &str) -> Result<()> {
    let store = open_store(config)?;
    let mut record = store.get(guild, name)?;
    record.set.negate(node);
    store.save(&record)?;
    println!("Negated '{node}' in set '{name}'.");
    Ok(())
}

fn cmd_reset(config: &Config, guild: &str, name: &str, node: &str) -> Result<()> {
    let store = open_store(config)?;
    let mut record = store.get(guild, name)?;
    record.set.reset(node);
    store.save(&record)?;
    println!("Reset '{node}' in set '{name}'.");
    Ok(())
}

enum TargetEdit {
    Add,
    Del,
}

fn cmd_edit_targets(
    config: &Config,
    guild: &str,
    name: &str,
    kind: &str,
    ids: Vec<String>,
    edit: TargetEdit,
) -> Result<()> {
    let kind = kind.parse::<TargetKind>()?;
    let store = open_store(config)?;
    let mut record = store.get(guild, name)?;

    match edit {
        TargetEdit::Add => record.set.add_targets(kind, ids),
        TargetEdit::Del => record.set.del_targets(kind, ids),
    }
    store.save(&record)?;

    println!(
        "Set '{name}' now targets {} roles, {} members.",
        record.set.roles.len(),
        record.set.members.len()
    );
    Ok(())
}

async fn cmd_check(
    config: &Config,
    member: &str,
    guild: Option<&str>,
    roles: Vec<String>,
    level: Option<&str>,
    node: Option<&str>,
) -> Result<()> {
    let gate = Gate::new(config.gate.clone());

    let mut actor = Actor::new(member).with_roles(roles);
    if let Some(guild) = guild {
        actor = actor.in_guild(guild);
    }

    let mut command = Command::new(node.unwrap_or("ad-hoc"));
    if let Some(node) = node {
        command = command.node(node);
    }
    if let Some(level) = level {
        command = command.level(level.parse::<AccessLevel>()?);
    }

    // A missing database is not an error here: the gate runs without node
    // checks, the same way a bot without a set store would.
    let path = db_path(config);
    let store = if path.exists() {
        Some(SetStore::open(&path)?)
    } else {
        None
    };

    println!("Member: {member}");
    println!(
        "Scope:  {}",
        actor.guild.as_deref().unwrap_or("(direct message)")
    );
    println!("Level:  {}", gate.access_level(&actor));

    match gate.check_via(store.as_ref(), &actor, &command).await? {
        Decision::Allow => println!("Result: allow"),
        Decision::Deny { reason } => {
            println!("Result: deny ({reason})");
            if let Some(node) = node {
                println!("Covered by any of: {}", covering_grants(node).join(", "));
            }
        }
    }

    Ok(())
}

/// Grants that would cover a node: the node itself, each wildcard above it,
/// and the bare wildcard.
fn covering_grants(node: &str) -> Vec<String> {
    let mut covering = vec![node.to_string()];
    for prefix in prefixes(node).iter().rev().skip(1) {
        covering.push(format!("{prefix}.*"));
    }
    covering.push("*".to_string());
    covering.dedup();
    covering
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn open_store(config: &Config) -> Result<SetStore> {
    let path = db_path(config);

    if !path.exists() {
        return Err(Error::DatabaseNotFound { path });
    }

    Ok(SetStore::open(&path)?)
}

fn db_path(config: &Config) -> PathBuf {
    match &config.storage.path {
        Some(path) => path.clone(),
        None => {
            let data_dir = dirs_data_dir().unwrap_or_else(|| ".steward".into());
            data_dir.join(DB_FILE)
        }
    }
}

fn dirs_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share/steward"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|p| p.join("steward"))
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|h| PathBuf::from(h).join("steward"))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

fn load_config() -> Result<Config> {
    let config_path = PathBuf::from(CONFIG_FILE);

    if config_path.exists() {
        Ok(Config::load(&config_path)?)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering_grants_ladder() {
        assert_eq!(
            covering_grants("perm.manage.roles"),
            ["perm.manage.roles", "perm.manage.*", "perm.*", "*"]
        );
        assert_eq!(covering_grants("ping"), ["ping", "*"]);
    }
}
