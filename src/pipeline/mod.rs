//! Request orchestration.
//!
//! [`PredictionPipeline`] runs one request through the full chain:
//! validate → encode → infer, and optionally persist. Every stage before
//! persistence is pure; persistence is best-effort downstream of a
//! successful inference. A storage failure is reported alongside the
//! answer, never instead of it — the computed yield is not lost because a
//! write failed.
//!
//! The pipeline holds only the read-only [`ModelBundle`], so one instance
//! serves concurrently executing requests without synchronization.

use tracing::{info, warn};

use crate::artifact::ModelBundle;
use crate::encode::encode;
use crate::inference::SchemaMismatchError;
use crate::request::{validate, RawRequest, ValidatedInput, ValidationError};
use crate::store::{PredictionRecord, PredictionStore, StoreError};

/// Why a request failed before any persistence was attempted.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// The raw request was rejected; the caller may correct and resubmit.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The encoded vector disagreed with the loaded artifacts. Not
    /// recoverable within a request; indicates artifact drift.
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
}

/// A computed yield estimate with the input it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The validated request.
    pub input: ValidatedInput,
    /// The estimated yield.
    pub yield_value: f32,
}

/// The result of predict-then-persist.
///
/// `yield_value` is always present: persistence runs after inference and its
/// failure does not undo the answer.
#[derive(Debug)]
pub struct PredictOutcome {
    /// The validated request.
    pub input: ValidatedInput,
    /// The estimated yield.
    pub yield_value: f32,
    /// The persisted record, or why persisting failed.
    pub persisted: Result<PredictionRecord, StoreError>,
}

/// The full request pipeline over a loaded model bundle.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    bundle: ModelBundle,
}

impl PredictionPipeline {
    /// Create a pipeline over a loaded bundle.
    pub fn new(bundle: ModelBundle) -> Self {
        Self { bundle }
    }

    /// The underlying bundle.
    #[inline]
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Validate, encode, and score one request.
    pub fn predict(&self, raw: &RawRequest) -> Result<Prediction, PredictError> {
        let input = validate(raw)?;
        let vector = encode(self.bundle.catalog(), &input);
        let yield_value = self.bundle.predictor().predict_row(&vector)?;

        info!(
            year = input.year,
            crop = %input.crop,
            season = %input.season,
            state = %input.state,
            yield_value,
            "prediction complete"
        );

        Ok(Prediction { input, yield_value })
    }

    /// Validate, encode, score, and persist one request for a user.
    ///
    /// Validation and inference failures abort before any write. Once a
    /// yield is computed it is returned regardless of how persistence goes;
    /// a failed or degraded write is carried in
    /// [`PredictOutcome::persisted`].
    pub fn predict_and_store(
        &self,
        store: &PredictionStore,
        user_email: &str,
        raw: &RawRequest,
    ) -> Result<PredictOutcome, PredictError> {
        let Prediction { input, yield_value } = self.predict(raw)?;

        let persisted = store
            .resolve_user(user_email)
            .and_then(|user_id| store.insert_prediction(user_id, &input, f64::from(yield_value)));
        if let Err(err) = &persisted {
            warn!(error = %err, "prediction computed but not persisted");
        }

        Ok(PredictOutcome {
            input,
            yield_value,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn raw_request() -> RawRequest {
        RawRequest {
            year: "2020".to_string(),
            crop: "Rice".to_string(),
            season: "Kharif".to_string(),
            state: "Punjab".to_string(),
            area: "100.0".to_string(),
            production: "250.0".to_string(),
            annual_rainfall: "800.0".to_string(),
            fertilizer: "50.0".to_string(),
            pesticide: "2.0".to_string(),
        }
    }

    #[test]
    fn predict_runs_the_full_chain() {
        let pipeline = PredictionPipeline::new(testing::demo_bundle());
        let prediction = pipeline.predict(&raw_request()).unwrap();
        assert_eq!(prediction.input.crop, "Rice");
        assert!(prediction.yield_value >= 0.0);
        // Rice goes right in the crop stump (30), area 100 goes right in the
        // area stump (40).
        assert_eq!(prediction.yield_value, 35.0);
    }

    #[test]
    fn predict_is_deterministic() {
        let pipeline = PredictionPipeline::new(testing::demo_bundle());
        let a = pipeline.predict(&raw_request()).unwrap();
        let b = pipeline.predict(&raw_request()).unwrap();
        assert_eq!(a.yield_value, b.yield_value);
    }

    #[test]
    fn invalid_request_never_reaches_the_store() {
        let pipeline = PredictionPipeline::new(testing::demo_bundle());
        let store = PredictionStore::open_in_memory().unwrap();
        store.create_user("Asha", "Verma", "asha@example.com").unwrap();

        let mut raw = raw_request();
        raw.area = "-5".to_string();
        let err = pipeline
            .predict_and_store(&store, "asha@example.com", &raw)
            .unwrap_err();
        assert!(matches!(err, PredictError::Validation(_)));
        assert_eq!(store.prediction_count().unwrap(), 0);
    }

    #[test]
    fn unknown_user_still_returns_the_yield() {
        let pipeline = PredictionPipeline::new(testing::demo_bundle());
        let store = PredictionStore::open_in_memory().unwrap();

        let outcome = pipeline
            .predict_and_store(&store, "nobody@example.com", &raw_request())
            .unwrap();
        assert_eq!(outcome.yield_value, 35.0);
        assert!(matches!(
            outcome.persisted,
            Err(StoreError::UnknownUser { .. })
        ));
    }

    #[test]
    fn successful_persist_matches_the_answer() {
        let pipeline = PredictionPipeline::new(testing::demo_bundle());
        let store = PredictionStore::open_in_memory().unwrap();
        store.create_user("Asha", "Verma", "asha@example.com").unwrap();

        let outcome = pipeline
            .predict_and_store(&store, "asha@example.com", &raw_request())
            .unwrap();
        let record = outcome.persisted.unwrap();
        assert_eq!(record.yield_value, f64::from(outcome.yield_value));
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.crop, "Rice");
    }
}
