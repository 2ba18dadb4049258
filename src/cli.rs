use crate::form::Field;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anklelog", version, about = "Daily ankle-health journal")]
pub struct Cli {
    /// Database path (sqlite backend)
    #[arg(long, env = "ANKLELOG_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.anklelog/config.toml)
    #[arg(long, env = "ANKLELOG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a new identifier
    Register(RegisterArgs),
    /// Record or overwrite a day's entry
    Log(LogArgs),
    /// Show the home summary: advisory, recent entries, chart
    Show(ShowArgs),
    /// Delete an account and all its entries
    DeleteUser(DeleteUserArgs),
    /// Interactive start / home / record screens on stdin
    Shell,
    /// Show database health: size, counts, encryption
    Status,
}

#[derive(Parser)]
pub struct RegisterArgs {
    /// Identifier to register
    pub id: String,
}

#[derive(Parser)]
pub struct LogArgs {
    /// Registered identifier
    #[arg(long)]
    pub user: String,

    /// Day to record (YYYY-MM-DD, default: today in KST)
    #[arg(long)]
    pub date: Option<String>,

    /// Instability 0-10
    #[arg(long, allow_hyphen_values = true)]
    pub instability: Option<String>,

    /// Pain 0-10
    #[arg(long, allow_hyphen_values = true)]
    pub pain: Option<String>,

    /// Activity level 0-10
    #[arg(long, allow_hyphen_values = true)]
    pub activity: Option<String>,

    /// Sprain today: none | occurred
    #[arg(long)]
    pub sprain: Option<String>,

    /// Balance issue today: none | occurred
    #[arg(long)]
    pub balance: Option<String>,

    /// Comma-separated: taping, brace, cold-pack, heat-pack, stretching, massage
    #[arg(long)]
    pub management: Option<String>,

    /// sneakers | dress-shoes | sandals | barefoot | boots
    #[arg(long)]
    pub footwear: Option<String>,

    /// flat | stairs | slope | uneven | slippery
    #[arg(long)]
    pub surface: Option<String>,
}

impl LogArgs {
    /// Fields given on the command line; the rest keep their pre-filled value.
    pub fn assignments(&self) -> Vec<(Field, &str)> {
        [
            (Field::Instability, &self.instability),
            (Field::Pain, &self.pain),
            (Field::Activity, &self.activity),
            (Field::Sprain, &self.sprain),
            (Field::Balance, &self.balance),
            (Field::Management, &self.management),
            (Field::Footwear, &self.footwear),
            (Field::Surface, &self.surface),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Registered identifier
    #[arg(long)]
    pub user: String,
}

#[derive(Parser)]
pub struct DeleteUserArgs {
    /// Identifier to delete
    pub id: String,

    /// Actually delete (default is a dry run)
    #[arg(long)]
    pub confirm: bool,
}
