//! Deterministic fixtures for tests.
//!
//! A hand-built bundle small enough to verify by eye: an identity power
//! transform and a two-stump forest over a ten-slot feature list. Used by
//! unit tests here and by the integration suites.

use std::path::Path;

use crate::artifact::{
    ArtifactPaths, FeatureNamesArtifact, ModelArtifact, ModelBundle, TransformArtifact,
    TreeArtifact, FEATURE_NAMES_FILE, MODEL_FILE, TRANSFORM_FILE,
};
use crate::catalog::SchemaCatalog;
use crate::inference::Predictor;
use crate::repr::{Forest, Tree};
use crate::transform::PowerTransform;

/// Feature names for the demo bundle: the five continuous columns plus a
/// few indicator slots.
pub fn demo_feature_names() -> Vec<String> {
    [
        "Area",
        "Production",
        "Annual_Rainfall",
        "Fertilizer",
        "Pesticide",
        "Crop_Rice",
        "Crop_Wheat",
        "Season_Kharif",
        "Season_Rabi",
        "State_Punjab",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
    Tree::new(
        vec![feature, 0, 0],
        vec![threshold, 0.0, 0.0],
        vec![1, 0, 0],
        vec![2, 0, 0],
        vec![false, true, true],
        vec![0.0, left, right],
    )
}

/// A bundle whose predictions are easy to compute by hand.
///
/// The transform is the identity (λ=1, mean 0, scale 1). The forest has two
/// stumps: one on the `Crop_Rice` indicator (no → 10, yes → 30) and one on
/// `Area` at 50 (below → 20, above → 40). The prediction is their mean.
pub fn demo_bundle() -> ModelBundle {
    let names = demo_feature_names();
    let n = names.len();

    let transform = PowerTransform::new(vec![1.0; n], vec![0.0; n], vec![1.0; n]);

    let mut forest = Forest::new(n);
    forest.push_tree(stump(5, 0.5, 10.0, 30.0));
    forest.push_tree(stump(0, 50.0, 20.0, 40.0));

    let catalog = SchemaCatalog::from_feature_names(names).expect("demo names parse");
    let predictor = Predictor::new(transform, forest).expect("demo widths agree");
    ModelBundle::from_parts(catalog, predictor).expect("demo bundle is consistent")
}

fn demo_tree_artifact(feature: u32, threshold: f64, left: f64, right: f64) -> TreeArtifact {
    TreeArtifact {
        num_nodes: 3,
        split_indices: vec![feature, 0, 0],
        thresholds: vec![threshold, 0.0, 0.0],
        children_left: vec![1, 0, 0],
        children_right: vec![2, 0, 0],
        is_leaf: vec![false, true, true],
        leaf_values: vec![0.0, left, right],
    }
}

/// The demo bundle as its three on-disk artifacts.
pub fn demo_artifacts() -> (ModelArtifact, TransformArtifact, FeatureNamesArtifact) {
    let names = demo_feature_names();
    let n = names.len();
    let model = ModelArtifact {
        num_features: n,
        trees: vec![
            demo_tree_artifact(5, 0.5, 10.0, 30.0),
            demo_tree_artifact(0, 50.0, 20.0, 40.0),
        ],
        feature_names: Some(names.clone()),
    };
    let transform = TransformArtifact {
        lambdas: vec![1.0; n],
        means: vec![0.0; n],
        scales: vec![1.0; n],
    };
    (model, transform, FeatureNamesArtifact { names })
}

/// Write the demo artifacts into a directory and return their paths.
pub fn write_demo_artifacts(dir: &Path) -> ArtifactPaths {
    let (model, transform, names) = demo_artifacts();
    write_json(&dir.join(MODEL_FILE), &model);
    write_json(&dir.join(TRANSFORM_FILE), &transform);
    write_json(&dir.join(FEATURE_NAMES_FILE), &names);
    ArtifactPaths::in_dir(dir)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    let json = serde_json::to_string_pretty(value).expect("fixture serializes");
    std::fs::write(path, json).expect("fixture writes");
}
