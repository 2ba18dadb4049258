pub mod analyzer;
pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod form;
pub mod journal;
pub mod memory_store;
pub mod record;
pub mod remote_store;
pub mod render;
pub mod schema;
pub mod session;
pub mod shell;
pub mod sqlite_store;
pub mod status;
pub mod store;

#[derive(Debug)]
pub enum AnkleError {
    Database(rusqlite::Error),
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(String),
    Validation(String),
    Duplicate(String),
    UnknownUser(String),
    Backend(String),
}

impl std::fmt::Display for AnkleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnkleError::Database(e) => write!(f, "database: {e}"),
            AnkleError::Io(e) => write!(f, "io: {e}"),
            AnkleError::Json(e) => write!(f, "json: {e}"),
            AnkleError::Config(msg) => write!(f, "config: {msg}"),
            AnkleError::Validation(msg) => write!(f, "invalid input: {msg}"),
            AnkleError::Duplicate(id) => write!(f, "identifier already registered: {id}"),
            AnkleError::UnknownUser(id) => write!(f, "unknown identifier: {id}"),
            AnkleError::Backend(msg) => write!(f, "store: {msg}"),
        }
    }
}

impl std::error::Error for AnkleError {}

impl From<rusqlite::Error> for AnkleError {
    fn from(e: rusqlite::Error) -> Self {
        AnkleError::Database(e)
    }
}

impl From<std::io::Error> for AnkleError {
    fn from(e: std::io::Error) -> Self {
        AnkleError::Io(e)
    }
}

impl From<serde_json::Error> for AnkleError {
    fn from(e: serde_json::Error) -> Self {
        AnkleError::Json(e)
    }
}

impl From<rusqlite_migration::Error> for AnkleError {
    fn from(e: rusqlite_migration::Error) -> Self {
        match e {
            rusqlite_migration::Error::RusqliteError { query: _, err } => AnkleError::Database(err),
            other => AnkleError::Config(format!("migration: {other}")),
        }
    }
}

impl AnkleError {
    /// Failures the user can correct at the current screen.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AnkleError::Validation(_) | AnkleError::Duplicate(_) | AnkleError::UnknownUser(_)
        )
    }
}
