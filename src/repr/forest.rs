//! Random-forest ensemble over regression trees.

use ndarray::ArrayView2;

use crate::utils::Parallelism;

use super::tree::{Tree, TreeValidationError};

/// Structural defects detectable in a frozen forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    /// Forest contains no trees.
    EmptyForest,
    /// A member tree failed validation.
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// A frozen ensemble of regression trees.
///
/// The ensemble prediction is the mean of the member trees' outputs. The
/// feature count is fixed at construction; every member tree must read only
/// features below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    n_features: usize,
}

impl Forest {
    /// Create an empty forest over `n_features` input features.
    pub fn new(n_features: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_features,
        }
    }

    /// Add a tree to the ensemble.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of member trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of input features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get a reference to a member tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Iterate over member trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Predict for a single sample: the mean of all tree outputs.
    ///
    /// `features` must have length [`Forest::n_features`]; this is the
    /// caller's contract (the predictor checks it once per request).
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        debug_assert_eq!(features.len(), self.n_features);
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        sum / self.trees.len() as f32
    }

    /// Predict for a batch of samples in a row-major `[n_samples, n_features]`
    /// matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not in standard (row-major, contiguous)
    /// layout or its width differs from [`Forest::n_features`].
    pub fn predict_batch(&self, samples: ArrayView2<'_, f32>, parallelism: Parallelism) -> Vec<f32> {
        assert_eq!(
            samples.ncols(),
            self.n_features,
            "sample matrix width must equal the forest's feature count"
        );
        parallelism.maybe_par_map(0..samples.nrows(), |row_idx| {
            let row = samples.row(row_idx);
            let row = row
                .as_slice()
                .expect("sample matrix must be row-major contiguous");
            self.predict_row(row)
        })
    }

    /// Validate structural invariants of every member tree.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.trees.is_empty() {
            return Err(ForestValidationError::EmptyForest);
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }
        Ok(())
    }
}
