//! On-disk schema for the frozen artifacts.
//!
//! These types define the stable JSON layout of the three artifacts exported
//! by the training pipeline: the random-forest model, the fitted power
//! transform, and the trained feature-name list. They are deliberately
//! separate from the runtime types so the storage format can evolve without
//! touching inference code; conversion (with validation) lives in
//! [`super::convert`].
//!
//! Values are stored as `f64` on disk and narrowed to `f32` at load time.

use serde::{Deserialize, Serialize};

/// Serialized random-forest regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Number of input features every tree was trained on.
    pub num_features: usize,
    /// Member trees, in ensemble order.
    pub trees: Vec<TreeArtifact>,
    /// Feature names, if the exporter recorded them. Informational; the
    /// authoritative list is the feature-names artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

/// One serialized tree (flat parallel arrays).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    /// Number of nodes (internal + leaves).
    pub num_nodes: u32,
    /// Split feature index per node (0 for leaves).
    pub split_indices: Vec<u32>,
    /// Split threshold per node (0.0 for leaves).
    pub thresholds: Vec<f64>,
    /// Left child index per node (0 for leaves).
    pub children_left: Vec<u32>,
    /// Right child index per node (0 for leaves).
    pub children_right: Vec<u32>,
    /// Whether each node is a leaf.
    pub is_leaf: Vec<bool>,
    /// Leaf value per node (0.0 for internal nodes).
    pub leaf_values: Vec<f64>,
}

/// Serialized fitted power transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformArtifact {
    /// Per-feature Yeo-Johnson exponent.
    pub lambdas: Vec<f64>,
    /// Per-feature mean of the stabilized training data.
    pub means: Vec<f64>,
    /// Per-feature scale of the stabilized training data. Always positive.
    pub scales: Vec<f64>,
}

/// Serialized trained feature-name list, in frozen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureNamesArtifact {
    /// Feature names in the exact order the model consumes them.
    pub names: Vec<String>,
}
