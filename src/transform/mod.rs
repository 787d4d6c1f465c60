//! Fitted power transform.
//!
//! The model was trained on power-stabilized inputs: each feature passes
//! through a Yeo-Johnson transform with a per-feature exponent, then is
//! standardized with the per-feature mean and scale observed at fit time.
//! The same parameters are applied verbatim at inference; nothing is refit.

/// Exponents this close to a branch's singular point use its log form.
const LAMBDA_EPS: f32 = 1e-6;

/// Per-feature Yeo-Johnson parameters plus standardization moments.
///
/// Pure given its loaded parameters; never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTransform {
    lambdas: Box<[f32]>,
    means: Box<[f32]>,
    scales: Box<[f32]>,
}

impl PowerTransform {
    /// Create a transform from fitted parameters.
    ///
    /// All three arrays must have the same length; scales must be positive
    /// (artifact conversion enforces both for untrusted input).
    pub fn new(lambdas: Vec<f32>, means: Vec<f32>, scales: Vec<f32>) -> Self {
        debug_assert_eq!(lambdas.len(), means.len());
        debug_assert_eq!(lambdas.len(), scales.len());
        Self {
            lambdas: lambdas.into_boxed_slice(),
            means: means.into_boxed_slice(),
            scales: scales.into_boxed_slice(),
        }
    }

    /// Number of features the transform was fitted on.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.lambdas.len()
    }

    /// Apply the fitted transform to one sample in place.
    ///
    /// `features` must have length [`PowerTransform::n_features`]; the
    /// predictor checks this once per request before calling in.
    pub fn transform_inplace(&self, features: &mut [f32]) {
        debug_assert_eq!(features.len(), self.n_features());
        for (i, value) in features.iter_mut().enumerate() {
            let stabilized = yeo_johnson(*value, self.lambdas[i]);
            *value = (stabilized - self.means[i]) / self.scales[i];
        }
    }
}

/// Yeo-Johnson power transform of a single value.
///
/// For x >= 0: `((x+1)^λ - 1) / λ`, or `ln(x+1)` as λ → 0.
/// For x < 0: `-((1-x)^(2-λ) - 1) / (2-λ)`, or `-ln(1-x)` as λ → 2.
#[inline]
fn yeo_johnson(x: f32, lambda: f32) -> f32 {
    if x >= 0.0 {
        if lambda.abs() < LAMBDA_EPS {
            (x + 1.0).ln()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else {
        let exponent = 2.0 - lambda;
        if exponent.abs() < LAMBDA_EPS {
            -(1.0 - x).ln()
        } else {
            -((1.0 - x).powf(exponent) - 1.0) / exponent
        }
    }
}
