//! Conversion from on-disk artifacts to runtime types.
//!
//! Artifacts are untrusted input: every structural invariant the runtime
//! types rely on is checked here, once, at load time. After conversion the
//! runtime types are assumed well-formed for the life of the process.

use std::path::PathBuf;

use crate::catalog::CatalogError;
use crate::inference::SchemaMismatchError;
use crate::repr::{Forest, ForestValidationError, Tree};
use crate::transform::PowerTransform;

use super::schema::{ModelArtifact, TransformArtifact, TreeArtifact};

/// Errors raised while loading or converting the frozen artifacts.
///
/// All variants are fatal to startup; there is no degraded mode for a
/// missing or corrupt artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// An artifact file could not be read.
    #[error("failed reading artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact file was not valid JSON for its schema.
    #[error("failed parsing artifact {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A tree's parallel arrays disagree with its declared node count.
    #[error("tree {tree_idx}: {field} has {actual} entries, expected {expected}")]
    TreeArrayLen {
        tree_idx: usize,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The forest failed structural validation.
    #[error("model artifact is structurally invalid: {0:?}")]
    InvalidForest(ForestValidationError),

    /// The transform's parameter arrays disagree in length.
    #[error("transform arrays disagree: {lambdas} lambdas, {means} means, {scales} scales")]
    TransformLenMismatch {
        lambdas: usize,
        means: usize,
        scales: usize,
    },

    /// A transform scale was zero or negative.
    #[error("transform scale for feature {index} must be positive, got {value}")]
    InvalidScale { index: usize, value: f64 },

    /// The three artifacts disagree on feature count.
    #[error(
        "artifacts disagree on feature count: model {model}, transform {transform}, \
         feature names {names}"
    )]
    FeatureCountMismatch {
        model: usize,
        transform: usize,
        names: usize,
    },

    /// The feature-name list could not be turned into a catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Transform and model widths disagree at predictor construction.
    #[error(transparent)]
    Mismatch(#[from] SchemaMismatchError),
}

fn check_tree_arrays(tree_idx: usize, tree: &TreeArtifact) -> Result<(), ArtifactError> {
    let expected = tree.num_nodes as usize;
    for (field, actual) in [
        ("split_indices", tree.split_indices.len()),
        ("thresholds", tree.thresholds.len()),
        ("children_left", tree.children_left.len()),
        ("children_right", tree.children_right.len()),
        ("is_leaf", tree.is_leaf.len()),
        ("leaf_values", tree.leaf_values.len()),
    ] {
        if actual != expected {
            return Err(ArtifactError::TreeArrayLen {
                tree_idx,
                field,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Build the runtime forest from its artifact, validating structure.
pub fn forest_from_artifact(artifact: &ModelArtifact) -> Result<Forest, ArtifactError> {
    let mut forest = Forest::new(artifact.num_features);
    for (tree_idx, tree) in artifact.trees.iter().enumerate() {
        check_tree_arrays(tree_idx, tree)?;
        forest.push_tree(Tree::new(
            tree.split_indices.clone(),
            tree.thresholds.iter().map(|&t| t as f32).collect(),
            tree.children_left.clone(),
            tree.children_right.clone(),
            tree.is_leaf.clone(),
            tree.leaf_values.iter().map(|&v| v as f32).collect(),
        ));
    }
    forest.validate().map_err(ArtifactError::InvalidForest)?;
    Ok(forest)
}

/// Build the runtime power transform from its artifact, validating shape
/// and positivity of the scales.
pub fn transform_from_artifact(artifact: &TransformArtifact) -> Result<PowerTransform, ArtifactError> {
    let (lambdas, means, scales) = (
        artifact.lambdas.len(),
        artifact.means.len(),
        artifact.scales.len(),
    );
    if lambdas != means || lambdas != scales {
        return Err(ArtifactError::TransformLenMismatch {
            lambdas,
            means,
            scales,
        });
    }
    for (index, &value) in artifact.scales.iter().enumerate() {
        if !(value > 0.0) {
            return Err(ArtifactError::InvalidScale { index, value });
        }
    }
    Ok(PowerTransform::new(
        artifact.lambdas.iter().map(|&v| v as f32).collect(),
        artifact.means.iter().map(|&v| v as f32).collect(),
        artifact.scales.iter().map(|&v| v as f32).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_tree(value: f64) -> TreeArtifact {
        TreeArtifact {
            num_nodes: 1,
            split_indices: vec![0],
            thresholds: vec![0.0],
            children_left: vec![0],
            children_right: vec![0],
            is_leaf: vec![true],
            leaf_values: vec![value],
        }
    }

    #[test]
    fn converts_well_formed_model() {
        let artifact = ModelArtifact {
            num_features: 3,
            trees: vec![leaf_tree(1.0), leaf_tree(3.0)],
            feature_names: None,
        };
        let forest = forest_from_artifact(&artifact).unwrap();
        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.predict_row(&[0.0, 0.0, 0.0]), 2.0);
    }

    #[test]
    fn rejects_mis_sized_tree_arrays() {
        let mut tree = leaf_tree(1.0);
        tree.leaf_values.push(9.0);
        let artifact = ModelArtifact {
            num_features: 1,
            trees: vec![tree],
            feature_names: None,
        };
        let err = forest_from_artifact(&artifact).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::TreeArrayLen {
                tree_idx: 0,
                field: "leaf_values",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_forest() {
        let artifact = ModelArtifact {
            num_features: 1,
            trees: vec![],
            feature_names: None,
        };
        assert!(matches!(
            forest_from_artifact(&artifact).unwrap_err(),
            ArtifactError::InvalidForest(ForestValidationError::EmptyForest)
        ));
    }

    #[test]
    fn rejects_tree_reading_out_of_bounds_feature() {
        let artifact = ModelArtifact {
            num_features: 1,
            trees: vec![TreeArtifact {
                num_nodes: 3,
                split_indices: vec![5, 0, 0],
                thresholds: vec![0.5, 0.0, 0.0],
                children_left: vec![1, 0, 0],
                children_right: vec![2, 0, 0],
                is_leaf: vec![false, true, true],
                leaf_values: vec![0.0, 1.0, 2.0],
            }],
            feature_names: None,
        };
        assert!(matches!(
            forest_from_artifact(&artifact).unwrap_err(),
            ArtifactError::InvalidForest(ForestValidationError::InvalidTree { .. })
        ));
    }

    #[test]
    fn rejects_transform_len_mismatch() {
        let artifact = TransformArtifact {
            lambdas: vec![1.0, 1.0],
            means: vec![0.0],
            scales: vec![1.0, 1.0],
        };
        assert!(matches!(
            transform_from_artifact(&artifact).unwrap_err(),
            ArtifactError::TransformLenMismatch { .. }
        ));
    }

    #[test]
    fn rejects_non_positive_scale() {
        let artifact = TransformArtifact {
            lambdas: vec![1.0],
            means: vec![0.0],
            scales: vec![0.0],
        };
        assert!(matches!(
            transform_from_artifact(&artifact).unwrap_err(),
            ArtifactError::InvalidScale { index: 0, .. }
        ));
    }
}
