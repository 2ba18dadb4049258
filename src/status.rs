use crate::config::{AnkleConfig, Backend};
use crate::db::{is_db_encrypted, open_db_readonly};
use crate::AnkleError;
use rusqlite::OptionalExtension;
use std::path::Path;

pub fn handle_status(db_path: &Path, config: &AnkleConfig) -> Result<(), AnkleError> {
    match config.store.backend {
        Backend::Sqlite => {}
        Backend::Memory => {
            eprintln!("anklelog: backend: memory (nothing persisted)");
            return Ok(());
        }
        Backend::Remote => {
            let endpoint = config.remote.endpoint.as_deref().unwrap_or("(unset)");
            eprintln!("anklelog: backend: remote at {endpoint}");
            return Ok(());
        }
    }

    if !db_path.exists() {
        eprintln!("anklelog: no database at {}", db_path.display());
        return Ok(());
    }

    let db_size = std::fs::metadata(db_path)?.len();
    let wal_path = db_path.with_extension("db-wal");
    let wal_size = std::fs::metadata(&wal_path).map(|m| m.len()).ok();

    let conn = open_db_readonly(db_path, config)?;

    let user_count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
    let record_count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))?;
    let last_entry: Option<(String, String)> = conn
        .query_row(
            "SELECT date, user_id FROM records ORDER BY date DESC, updated_at DESC LIMIT 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;

    match wal_size {
        Some(ws) => eprintln!("anklelog: database: {} (+{} WAL)", fmt_size(db_size), fmt_size(ws)),
        None => eprintln!("anklelog: database: {}", fmt_size(db_size)),
    }
    eprintln!("anklelog: users: {user_count}");
    eprintln!("anklelog: entries: {record_count}");

    if let Some((date, user)) = last_entry {
        eprintln!("anklelog: last entry: {date} ({user})");
    }

    let encrypted = is_db_encrypted(db_path);
    eprintln!(
        "anklelog: encryption: {}",
        if encrypted { "enabled" } else { "disabled" }
    );

    Ok(())
}

fn fmt_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_scale_units() {
        assert_eq!(fmt_size(512), "512 B");
        assert_eq!(fmt_size(2048), "2.0 KB");
        assert_eq!(fmt_size(3 * 1024 * 1024), "3.0 MB");
    }
}
