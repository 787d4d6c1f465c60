//! Read-only aggregate queries over the prediction table.
//!
//! Consumed by an outer reporting/rendering layer. Like the write path,
//! queries adapt to the table's actual column set: optional columns the
//! schema lacks are selected as NULL so rows map uniformly, and ordering
//! falls back to insertion order when no timestamp column exists.

use rusqlite::params;
use serde::Serialize;

use super::record::PredictionRecord;
use super::{PredictionStore, StoreError};

/// How often one crop was predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropCount {
    /// Crop label.
    pub crop: String,
    /// Number of predictions for it.
    pub count: i64,
}

/// Per-user prediction activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActivity {
    /// User row id.
    pub user_id: i64,
    /// "firstname lastname".
    pub name: String,
    /// Account email.
    pub email: String,
    /// Number of predictions the user has made.
    pub predictions: i64,
}

impl PredictionStore {
    /// Total number of persisted predictions.
    pub fn prediction_count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// The most-predicted crops, descending, at most `limit` rows.
    pub fn top_crops(&self, limit: usize) -> Result<Vec<CropCount>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT crop, COUNT(*) AS n FROM predictions \
             GROUP BY crop ORDER BY n DESC, crop ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(CropCount {
                    crop: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Prediction counts per user, for users that have predicted at least
    /// once, ordered by user id.
    pub fn user_activity(&self) -> Result<Vec<UserActivity>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT u.id, u.firstname || ' ' || u.lastname, u.email, COUNT(p.id) \
             FROM users u JOIN predictions p ON p.user_id = u.id \
             GROUP BY u.id, u.firstname, u.lastname, u.email \
             ORDER BY u.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UserActivity {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    predictions: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The newest predictions, at most `limit` rows.
    ///
    /// Columns the schema lacks come back as `None`. Rows order by write
    /// time when the schema records it, by insertion order otherwise.
    pub fn recent_predictions(&self, limit: usize) -> Result<Vec<PredictionRecord>, StoreError> {
        let columns = self.table_columns("predictions")?;
        let year_expr = if columns.contains("year") {
            "year"
        } else {
            "NULL AS year"
        };
        let created_expr = if columns.contains("created_at_unix") {
            "created_at_unix"
        } else {
            "NULL AS created_at_unix"
        };
        let order_expr = if columns.contains("created_at_unix") {
            "created_at_unix DESC, id DESC"
        } else {
            "id DESC"
        };

        let sql = format!(
            "SELECT id, user_id, {year_expr}, crop, season, state, area, production, \
             annual_rainfall, fertilizer, pesticide, yield_value, {created_expr} \
             FROM predictions ORDER BY {order_expr} LIMIT ?1"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(PredictionRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    year: row.get(2)?,
                    crop: row.get(3)?,
                    season: row.get(4)?,
                    state: row.get(5)?,
                    area: row.get(6)?,
                    production: row.get(7)?,
                    annual_rainfall: row.get(8)?,
                    fertilizer: row.get(9)?,
                    pesticide: row.get(10)?,
                    yield_value: row.get(11)?,
                    created_at_unix: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
