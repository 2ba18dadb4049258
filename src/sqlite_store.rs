use crate::config::AnkleConfig;
use crate::db::open_db;
use crate::record::{
    AnkleRecord, Choice, DATE_FORMAT, Footwear, Level, Management, Occurrence, Surface, UserId,
    parse_date,
};
use crate::store::RecordStore;
use crate::AnkleError;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const RECORD_COLUMNS: &str =
    "date, instability, pain, activity, sprain, balance, management, footwear, surface";

/// Embedded store backed by a local SQLite (SQLCipher) file.
pub struct SqliteStore {
    conn: Connection,
}

/// Row as stored; converted to a validated `AnkleRecord` outside rusqlite callbacks.
struct StoredRow {
    date: String,
    instability: i64,
    pain: i64,
    activity: i64,
    sprain: String,
    balance: String,
    management: String,
    footwear: String,
    surface: String,
}

impl StoredRow {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            date: r.get(0)?,
            instability: r.get(1)?,
            pain: r.get(2)?,
            activity: r.get(3)?,
            sprain: r.get(4)?,
            balance: r.get(5)?,
            management: r.get(6)?,
            footwear: r.get(7)?,
            surface: r.get(8)?,
        })
    }

    fn into_record(self) -> Result<AnkleRecord, AnkleError> {
        let corrupt = |e: AnkleError| AnkleError::Backend(format!("stored record {}: {e}", self.date));
        Ok(AnkleRecord {
            date: parse_date(&self.date).map_err(corrupt)?,
            instability: Level::new(self.instability).map_err(corrupt)?,
            pain: Level::new(self.pain).map_err(corrupt)?,
            activity: Level::new(self.activity).map_err(corrupt)?,
            sprain: Occurrence::parse_choice(&self.sprain).map_err(corrupt)?,
            balance: Occurrence::parse_choice(&self.balance).map_err(corrupt)?,
            management: Management::parse_list(&self.management).map_err(corrupt)?,
            footwear: Footwear::parse_choice(&self.footwear).map_err(corrupt)?,
            surface: Surface::parse_choice(&self.surface).map_err(corrupt)?,
        })
    }
}

impl SqliteStore {
    pub fn open(db_path: &Path, config: &AnkleConfig) -> Result<Self, AnkleError> {
        Ok(Self {
            conn: open_db(db_path, config)?,
        })
    }

    /// Wrap a connection that already has the schema applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl RecordStore for SqliteStore {
    fn user_exists(&self, user: &UserId) -> Result<bool, AnkleError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![user.as_str()],
            |r| r.get(0),
        )?;
        Ok(exists)
    }

    fn create_user(&self, user: &UserId) -> Result<(), AnkleError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (id) VALUES (?1)",
            params![user.as_str()],
        )?;
        if inserted == 0 {
            return Err(AnkleError::Duplicate(user.to_string()));
        }
        log::info!("registered user {user}");
        Ok(())
    }

    fn upsert(&self, user: &UserId, record: &AnkleRecord) -> Result<(), AnkleError> {
        let tx = self.conn.unchecked_transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![user.as_str()],
            |r| r.get(0),
        )?;
        if !exists {
            return Err(AnkleError::UnknownUser(user.to_string()));
        }

        tx.execute(
            "INSERT INTO records (user_id, date, instability, pain, activity, sprain, balance, management, footwear, surface, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, unixepoch('now'))
             ON CONFLICT(user_id, date) DO UPDATE SET
                instability = excluded.instability,
                pain        = excluded.pain,
                activity    = excluded.activity,
                sprain      = excluded.sprain,
                balance     = excluded.balance,
                management  = excluded.management,
                footwear    = excluded.footwear,
                surface     = excluded.surface,
                updated_at  = excluded.updated_at",
            params![
                user.as_str(),
                date_key(record.date),
                record.instability.get(),
                record.pain.get(),
                record.activity.get(),
                record.sprain.as_str(),
                record.balance.as_str(),
                record.management.to_text(),
                record.footwear.as_str(),
                record.surface.as_str(),
            ],
        )?;

        tx.commit()?;
        log::debug!("upsert {user}/{}", record.date);
        Ok(())
    }

    fn get_record(&self, user: &UserId, date: NaiveDate) -> Result<Option<AnkleRecord>, AnkleError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE user_id = ?1 AND date = ?2"),
                params![user.as_str(), date_key(date)],
                StoredRow::from_row,
            )
            .optional()?;
        row.map(StoredRow::into_record).transpose()
    }

    fn list_records(&self, user: &UserId) -> Result<Vec<AnkleRecord>, AnkleError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE user_id = ?1 ORDER BY date ASC"
        ))?;
        let rows: Vec<StoredRow> = stmt
            .query_map(params![user.as_str()], StoredRow::from_row)?
            .collect::<Result<_, _>>()?;
        rows.into_iter().map(StoredRow::into_record).collect()
    }

    fn delete_user(&self, user: &UserId) -> Result<usize, AnkleError> {
        let tx = self.conn.unchecked_transaction()?;
        let records: i64 = tx.query_row(
            "SELECT COUNT(*) FROM records WHERE user_id = ?1",
            params![user.as_str()],
            |r| r.get(0),
        )?;
        // records go with the user via ON DELETE CASCADE
        let deleted = tx.execute("DELETE FROM users WHERE id = ?1", params![user.as_str()])?;
        if deleted == 0 {
            return Err(AnkleError::UnknownUser(user.to_string()));
        }
        tx.commit()?;
        log::info!("deleted user {user} ({records} records)");
        Ok(records as usize)
    }
}
