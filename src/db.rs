use crate::config::{AnkleConfig, anklelog_dir};
use crate::schema::MIGRATIONS;
use crate::AnkleError;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    ReadOnly,
    ReadWrite,
}

fn prepare_parent(db_path: &Path) -> std::io::Result<()> {
    let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    if dir.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Journal entries are health data: owner-only.
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_file(db_path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if db_path.exists() {
        std::fs::set_permissions(db_path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_file(_db_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn read_key_file(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let key = text.trim();
    (!key.is_empty()).then(|| key.to_string())
}

/// SQLCipher key, first hit wins: `ANKLELOG_KEY`, `[encryption] key_file`,
/// `~/.anklelog/key`. `None` means the database is stored in plain text.
pub fn load_key(config: &AnkleConfig) -> Option<String> {
    if let Ok(k) = std::env::var("ANKLELOG_KEY")
        && !k.is_empty()
    {
        return Some(k);
    }
    let path: PathBuf = match &config.encryption.key_file {
        Some(p) => p.clone(),
        None => anklelog_dir().join("key"),
    };
    read_key_file(&path)
}

/// Raw hex key (`x'..'`), so no PBKDF2 on every open.
fn unlock(conn: &Connection, key: &str) -> Result<(), AnkleError> {
    conn.pragma_update(None, "key", format!("x'{key}'"))?;
    check_readable(conn)
        .map_err(|_| AnkleError::Config("wrong encryption key or corrupt database".into()))
}

fn check_readable(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
}

/// True when the file exists but cannot be read without a key.
pub fn is_db_encrypted(db_path: &Path) -> bool {
    db_path.exists()
        && Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .is_ok_and(|conn| check_readable(&conn).is_err())
}

fn connect(db_path: &Path, config: &AnkleConfig, mode: Mode) -> Result<Connection, AnkleError> {
    let conn = match mode {
        Mode::ReadOnly => Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?,
        Mode::ReadWrite => Connection::open(db_path)?,
    };

    // The key must be the first statement on the connection.
    if let Some(key) = load_key(config) {
        unlock(&conn, &key)?;
    }

    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    if mode == Mode::ReadWrite {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }
    Ok(conn)
}

/// Open an existing journal without migrating it.
pub fn open_db_readonly(db_path: &Path, config: &AnkleConfig) -> Result<Connection, AnkleError> {
    if !db_path.exists() {
        return Err(AnkleError::Config(format!(
            "database not found: {}",
            db_path.display()
        )));
    }
    connect(db_path, config, Mode::ReadOnly)
}

/// Open or create the journal and bring the schema up to date.
pub fn open_db(db_path: &Path, config: &AnkleConfig) -> Result<Connection, AnkleError> {
    prepare_parent(db_path)?;
    let mut conn = connect(db_path, config, Mode::ReadWrite)?;
    MIGRATIONS.to_latest(&mut conn)?;
    restrict_file(db_path)?;
    log::debug!("journal open at {}", db_path.display());
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_db_creates_parent_and_schema() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("journal.db");
        let conn = open_db(&db_path, &AnkleConfig::default()).unwrap();
        let n: i64 = conn
            .query_row("SELECT count(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
        assert!(db_path.exists());
        assert!(!is_db_encrypted(&db_path));
    }

    #[cfg(unix)]
    #[test]
    fn db_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("journal.db");
        open_db(&db_path, &AnkleConfig::default()).unwrap();
        let mode = std::fs::metadata(&db_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn readonly_open_requires_existing_db() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("absent.db");
        assert!(open_db_readonly(&db_path, &AnkleConfig::default()).is_err());
        assert!(!is_db_encrypted(&db_path));
    }

    #[test]
    fn key_file_from_config_is_applied() {
        let dir = tempfile::TempDir::new().unwrap();
        let key_path = dir.path().join("key");
        std::fs::write(&key_path, format!("{}\n", "c".repeat(64))).unwrap();
        let config: AnkleConfig = toml::from_str(&format!(
            "[encryption]\nkey_file = {:?}\n",
            key_path.display().to_string()
        ))
        .unwrap();
        assert_eq!(load_key(&config).as_deref(), Some("c".repeat(64).as_str()));

        let db_path = dir.path().join("secret.db");
        open_db(&db_path, &config).unwrap();
        assert!(is_db_encrypted(&db_path));
        open_db_readonly(&db_path, &config).unwrap();
    }

    #[test]
    fn blank_key_file_means_plaintext() {
        let dir = tempfile::TempDir::new().unwrap();
        let key_path = dir.path().join("key");
        std::fs::write(&key_path, "  \n").unwrap();
        assert_eq!(read_key_file(&key_path), None);
        assert_eq!(read_key_file(&dir.path().join("missing")), None);
    }
}
