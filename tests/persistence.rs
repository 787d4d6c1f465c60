//! Persistence against stores whose schema lags the current column set.

use cropcast::request::ValidatedInput;
use cropcast::store::{PredictionStore, StoreError};
use rusqlite::Connection;
use std::path::Path;

fn sample_input() -> ValidatedInput {
    ValidatedInput {
        year: 2020,
        crop: "Rice".to_string(),
        season: "Kharif".to_string(),
        state: "Punjab".to_string(),
        area: 100.0,
        production: 250.0,
        annual_rainfall: 800.0,
        fertilizer: 50.0,
        pesticide: 2.0,
    }
}

/// Create a database whose predictions table declares only the given
/// columns, the way a deployment running an older schema would.
fn create_legacy_db(path: &Path, prediction_columns: &str) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(&format!(
        "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            firstname TEXT NOT NULL,
            lastname TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL
        );
        CREATE TABLE predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {prediction_columns}
        );
        "
    ))
    .unwrap();
}

const LEGACY_WITHOUT_YEAR: &str = "
    user_id INTEGER NOT NULL,
    crop TEXT NOT NULL,
    season TEXT NOT NULL,
    state TEXT NOT NULL,
    area REAL NOT NULL,
    production REAL NOT NULL,
    annual_rainfall REAL NOT NULL,
    fertilizer REAL NOT NULL,
    pesticide REAL NOT NULL,
    yield_value REAL NOT NULL,
    created_at_unix INTEGER";

const LEGACY_MINIMAL: &str = "
    user_id INTEGER NOT NULL,
    crop TEXT NOT NULL,
    season TEXT NOT NULL,
    state TEXT NOT NULL,
    area REAL NOT NULL,
    production REAL NOT NULL,
    annual_rainfall REAL NOT NULL,
    fertilizer REAL NOT NULL,
    pesticide REAL NOT NULL,
    yield_value REAL NOT NULL";

const LEGACY_BROKEN: &str = "
    user_id INTEGER NOT NULL,
    crop TEXT NOT NULL";

#[test]
fn write_without_year_column_keeps_everything_else() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    create_legacy_db(&path, LEGACY_WITHOUT_YEAR);

    let store = PredictionStore::open(&path).unwrap();
    let user_id = store.create_user("Asha", "Verma", "asha@example.com").unwrap();
    let record = store
        .insert_prediction(user_id, &sample_input(), 3.5)
        .unwrap();

    assert_eq!(record.year, None);
    assert!(record.created_at_unix.is_some());
    assert_eq!(record.crop, "Rice");
    assert_eq!(record.season, "Kharif");
    assert_eq!(record.state, "Punjab");
    assert_eq!(record.area, 100.0);
    assert_eq!(record.yield_value, 3.5);

    // And it really landed in the table.
    assert_eq!(store.prediction_count().unwrap(), 1);
}

#[test]
fn write_against_minimal_schema_drops_both_optional_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    create_legacy_db(&path, LEGACY_MINIMAL);

    let store = PredictionStore::open(&path).unwrap();
    let user_id = store.create_user("Asha", "Verma", "asha@example.com").unwrap();
    let record = store
        .insert_prediction(user_id, &sample_input(), 2.25)
        .unwrap();

    assert_eq!(record.year, None);
    assert_eq!(record.created_at_unix, None);
    assert_eq!(record.yield_value, 2.25);
}

#[test]
fn missing_mandatory_columns_are_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    create_legacy_db(&path, LEGACY_BROKEN);

    let store = PredictionStore::open(&path).unwrap();
    let user_id = store.create_user("Asha", "Verma", "asha@example.com").unwrap();
    let err = store
        .insert_prediction(user_id, &sample_input(), 1.0)
        .unwrap_err();

    let StoreError::SchemaIncompatible { missing } = err else {
        panic!("expected SchemaIncompatible, got {err:?}");
    };
    assert!(missing.contains(&"yield_value".to_string()));
    assert_eq!(store.prediction_count().unwrap(), 0);
}

#[test]
fn reports_tolerate_legacy_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    create_legacy_db(&path, LEGACY_MINIMAL);

    let store = PredictionStore::open(&path).unwrap();
    let user_id = store.create_user("Asha", "Verma", "asha@example.com").unwrap();
    store.insert_prediction(user_id, &sample_input(), 1.0).unwrap();
    store.insert_prediction(user_id, &sample_input(), 2.0).unwrap();

    let recent = store.recent_predictions(10).unwrap();
    assert_eq!(recent.len(), 2);
    // Newest first by insertion order when no timestamp column exists.
    assert_eq!(recent[0].yield_value, 2.0);
    assert_eq!(recent[0].year, None);
    assert_eq!(recent[0].created_at_unix, None);

    let top = store.top_crops(5).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].crop, "Rice");
    assert_eq!(top[0].count, 2);
}

#[test]
fn current_schema_round_trips_through_reports() {
    let dir = tempfile::tempdir().unwrap();
    let store = PredictionStore::open(dir.path().join("current.db")).unwrap();
    let user_id = store.create_user("Asha", "Verma", "asha@example.com").unwrap();
    let record = store
        .insert_prediction(user_id, &sample_input(), 4.0)
        .unwrap();

    let recent = store.recent_predictions(1).unwrap();
    assert_eq!(recent, vec![record]);

    let activity = store.user_activity().unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].predictions, 1);
}
