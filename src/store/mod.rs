//! Durable prediction storage.
//!
//! SQLite-backed persistence for users and their prediction records. The
//! predictions table in a deployed store may predate the `year` and
//! `created_at_unix` columns, so every write first negotiates a
//! [`WritePlan`] against the table's actual column set (via
//! `PRAGMA table_info`) and then writes exactly once with the columns that
//! exist. A write that had to drop optional columns is a logged degradation,
//! not an error; a table missing mandatory columns is terminal.
//!
//! The store never implements its own locking; conflicting writers serialize
//! at the SQLite layer.

use std::collections::HashSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, types::Value, Connection, OptionalExtension};
use tracing::warn;

use crate::request::ValidatedInput;

pub mod record;
pub mod reports;

pub use record::PredictionRecord;
pub use reports::{CropCount, UserActivity};

/// Columns every usable predictions table must have.
const MANDATORY_COLUMNS: [&str; 10] = [
    "user_id",
    "crop",
    "season",
    "state",
    "area",
    "production",
    "annual_rainfall",
    "fertilizer",
    "pesticide",
    "yield_value",
];

// =============================================================================
// StoreError
// =============================================================================

/// Errors raised by the prediction store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No user row exists for the given email.
    #[error("no account found for {email}")]
    UnknownUser { email: String },

    /// The predictions table lacks columns the record cannot be written
    /// without.
    #[error("predictions table is missing required columns: {}", .missing.join(", "))]
    SchemaIncompatible { missing: Vec<String> },

    /// Any other storage failure.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

// =============================================================================
// WritePlan
// =============================================================================

/// Which optional columns a prediction write will include.
///
/// Negotiated per write from the table's declared columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePlan {
    /// Write the `year` column.
    pub include_year: bool,
    /// Write the `created_at_unix` column.
    pub include_created_at: bool,
}

impl WritePlan {
    /// Negotiate a plan against a table's declared column set.
    ///
    /// Mandatory columns missing → [`StoreError::SchemaIncompatible`].
    /// Optional columns missing → a degraded (but valid) plan.
    pub fn negotiate(columns: &HashSet<String>) -> Result<Self, StoreError> {
        let missing: Vec<String> = MANDATORY_COLUMNS
            .iter()
            .filter(|&&c| !columns.contains(c))
            .map(|&c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::SchemaIncompatible { missing });
        }
        Ok(Self {
            include_year: columns.contains("year"),
            include_created_at: columns.contains("created_at_unix"),
        })
    }

    /// Returns true if any optional column had to be dropped.
    pub fn is_degraded(&self) -> bool {
        !self.include_year || !self.include_created_at
    }
}

// =============================================================================
// PredictionStore
// =============================================================================

/// SQLite-backed store for users and prediction records.
#[derive(Debug)]
pub struct PredictionStore {
    conn: Connection,
}

impl PredictionStore {
    /// Open (and if necessary create) a store at the given path.
    ///
    /// Creates the baseline schema when the tables do not exist yet. An
    /// existing predictions table is used as-is, whatever columns it has;
    /// writes negotiate against it per request.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open an in-memory store. Test and tooling convenience.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                firstname TEXT NOT NULL,
                lastname TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL
            );
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                year INTEGER,
                crop TEXT NOT NULL,
                season TEXT NOT NULL,
                state TEXT NOT NULL,
                area REAL NOT NULL,
                production REAL NOT NULL,
                annual_rainfall REAL NOT NULL,
                fertilizer REAL NOT NULL,
                pesticide REAL NOT NULL,
                yield_value REAL NOT NULL,
                created_at_unix INTEGER,
                FOREIGN KEY(user_id) REFERENCES users(id)
            );
            ",
        )?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection. Reporting helpers use this; most
    /// callers should not need it.
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create a user row, returning its id.
    pub fn create_user(
        &self,
        firstname: &str,
        lastname: &str,
        email: &str,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO users (firstname, lastname, email) VALUES (?1, ?2, ?3)",
            params![firstname, lastname, email.trim().to_lowercase()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Resolve an authenticated user identifier (email) to its row id.
    ///
    /// The identifier is trusted as authenticated; this only checks that the
    /// account exists.
    pub fn resolve_user(&self, email: &str) -> Result<i64, StoreError> {
        let normalized = email.trim().to_lowercase();
        self.conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![normalized],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(StoreError::UnknownUser { email: normalized })
    }

    /// Columns the named table actually declares.
    pub fn table_columns(&self, table: &str) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(columns)
    }

    /// Persist one prediction.
    ///
    /// Negotiates a [`WritePlan`] against the predictions table, writes once
    /// with the columns that exist, and returns the record as written.
    /// Optional columns absent from the schema come back as `None`; the
    /// yield value is stored unconditionally.
    pub fn insert_prediction(
        &self,
        user_id: i64,
        input: &ValidatedInput,
        yield_value: f64,
    ) -> Result<PredictionRecord, StoreError> {
        let columns = self.table_columns("predictions")?;
        let plan = WritePlan::negotiate(&columns)?;
        if plan.is_degraded() {
            warn!(
                include_year = plan.include_year,
                include_created_at = plan.include_created_at,
                "predictions table is missing optional columns; writing reduced record"
            );
        }

        let created_at_unix = plan.include_created_at.then(now_unix);

        let mut names: Vec<&str> = MANDATORY_COLUMNS.to_vec();
        let mut values: Vec<Value> = vec![
            Value::Integer(user_id),
            Value::Text(input.crop.clone()),
            Value::Text(input.season.clone()),
            Value::Text(input.state.clone()),
            Value::Real(input.area),
            Value::Real(input.production),
            Value::Real(input.annual_rainfall),
            Value::Real(input.fertilizer),
            Value::Real(input.pesticide),
            Value::Real(yield_value),
        ];
        if plan.include_year {
            names.push("year");
            values.push(Value::Integer(input.year as i64));
        }
        if let Some(ts) = created_at_unix {
            names.push("created_at_unix");
            values.push(Value::Integer(ts));
        }

        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO predictions ({}) VALUES ({})",
            names.join(", "),
            placeholders.join(", ")
        );
        self.conn
            .execute(&sql, rusqlite::params_from_iter(values))?;

        Ok(PredictionRecord {
            id: self.conn.last_insert_rowid(),
            user_id,
            year: plan.include_year.then_some(input.year),
            crop: input.crop.clone(),
            season: input.season.clone(),
            state: input.state.clone(),
            area: input.area,
            production: input.production,
            annual_rainfall: input.annual_rainfall,
            fertilizer: input.fertilizer,
            pesticide: input.pesticide,
            yield_value,
            created_at_unix,
        })
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
