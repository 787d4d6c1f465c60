//! Persisted prediction records.

use serde::Serialize;

/// One persisted request/result pair.
///
/// `year` and `created_at_unix` are `None` when the store's schema predates
/// those columns; every other field is always present. The yield value is
/// always the inference engine's output, never null. Records are written
/// once and never updated or deleted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning user's row id.
    pub user_id: i64,
    /// Request year, if the schema has the column.
    pub year: Option<i32>,
    /// Crop label.
    pub crop: String,
    /// Season label.
    pub season: String,
    /// State label.
    pub state: String,
    /// Cultivated area.
    pub area: f64,
    /// Total production.
    pub production: f64,
    /// Annual rainfall.
    pub annual_rainfall: f64,
    /// Fertilizer usage.
    pub fertilizer: f64,
    /// Pesticide usage.
    pub pesticide: f64,
    /// Predicted yield.
    pub yield_value: f64,
    /// Write time in unix seconds, if the schema has the column.
    pub created_at_unix: Option<i64>,
}
