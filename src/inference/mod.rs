//! Yield inference over the frozen artifacts.
//!
//! [`Predictor`] owns the fitted [`PowerTransform`] and the frozen
//! [`Forest`] and applies them in sequence: stabilize, then score. Both
//! stages are pure functions of their loaded parameters and the input
//! vector; given the same vector the yield estimate is always identical.
//!
//! Shape agreement between the vector and the loaded artifacts is checked up
//! front and surfaced as [`SchemaMismatchError`] rather than corrected: a
//! mismatch means the artifacts drifted from the feature list, and every
//! answer computed from them would be garbage.

use ndarray::ArrayView2;

use crate::encode::FeatureVector;
use crate::repr::Forest;
use crate::transform::PowerTransform;
use crate::utils::Parallelism;

/// A vector's shape disagrees with a loaded artifact's expectation.
///
/// Fatal to the request; surfaced before any persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature vector has {actual} slots but the {stage} expects {expected}")]
pub struct SchemaMismatchError {
    /// Which artifact the vector disagreed with.
    pub stage: &'static str,
    /// Slot count the artifact was built for.
    pub expected: usize,
    /// Slot count actually supplied.
    pub actual: usize,
}

/// The frozen inference engine: fitted transform, then ensemble.
#[derive(Debug, Clone)]
pub struct Predictor {
    transform: PowerTransform,
    forest: Forest,
}

impl Predictor {
    /// Pair a fitted transform with a frozen forest.
    ///
    /// Fails if the two disagree on feature count: that combination could
    /// never produce a meaningful score.
    pub fn new(transform: PowerTransform, forest: Forest) -> Result<Self, SchemaMismatchError> {
        if transform.n_features() != forest.n_features() {
            return Err(SchemaMismatchError {
                stage: "regression model",
                expected: forest.n_features(),
                actual: transform.n_features(),
            });
        }
        Ok(Self { transform, forest })
    }

    /// Number of features both stages expect.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.forest.n_features()
    }

    /// The fitted transform.
    #[inline]
    pub fn transform(&self) -> &PowerTransform {
        &self.transform
    }

    /// The frozen forest.
    #[inline]
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Compute the yield estimate for one encoded request.
    pub fn predict_row(&self, vector: &FeatureVector) -> Result<f32, SchemaMismatchError> {
        self.check_width(vector.len())?;
        let mut stabilized = vector.as_slice().to_vec();
        self.transform.transform_inplace(&mut stabilized);
        Ok(self.forest.predict_row(&stabilized))
    }

    /// Score a row-major `[n_samples, n_features]` batch.
    ///
    /// Used by reporting/backfill flows; request handling goes through
    /// [`Predictor::predict_row`].
    pub fn predict_batch(
        &self,
        samples: ArrayView2<'_, f32>,
        parallelism: Parallelism,
    ) -> Result<Vec<f32>, SchemaMismatchError> {
        self.check_width(samples.ncols())?;
        let scores = parallelism.maybe_par_map(0..samples.nrows(), |row_idx| {
            let mut stabilized = samples.row(row_idx).to_vec();
            self.transform.transform_inplace(&mut stabilized);
            self.forest.predict_row(&stabilized)
        });
        Ok(scores)
    }

    fn check_width(&self, actual: usize) -> Result<(), SchemaMismatchError> {
        let expected = self.n_features();
        if actual != expected {
            return Err(SchemaMismatchError {
                stage: "fitted transform",
                expected,
                actual,
            });
        }
        Ok(())
    }
}
