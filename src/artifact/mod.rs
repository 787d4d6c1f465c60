//! Frozen artifact loading.
//!
//! The trained pipeline ships as three opaque, versionless files exported at
//! training time: the random-forest model, the fitted power transform, and
//! the ordered feature-name list. [`ModelBundle::load`] reads all three,
//! validates them individually and against each other, and produces the
//! read-only state every request shares. Loading failure is fatal; nothing
//! downstream runs without a complete bundle.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bon::Builder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::catalog::SchemaCatalog;
use crate::inference::Predictor;

pub mod convert;
pub mod schema;

pub use convert::{forest_from_artifact, transform_from_artifact, ArtifactError};
pub use schema::{FeatureNamesArtifact, ModelArtifact, TransformArtifact, TreeArtifact};

/// Conventional artifact file names inside a model directory.
pub const MODEL_FILE: &str = "random_forest.json";
/// See [`MODEL_FILE`].
pub const TRANSFORM_FILE: &str = "power_transform.json";
/// See [`MODEL_FILE`].
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";

/// Locations of the three frozen artifacts.
///
/// # Example
///
/// ```ignore
/// use cropcast::artifact::ArtifactPaths;
///
/// // Conventional layout under one directory:
/// let paths = ArtifactPaths::in_dir("models");
///
/// // Or spelled out:
/// let paths = ArtifactPaths::builder()
///     .model("models/random_forest.json")
///     .transform("models/power_transform.json")
///     .feature_names("models/feature_names.json")
///     .build();
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ArtifactPaths {
    /// Random-forest model artifact.
    #[builder(into)]
    pub model: PathBuf,
    /// Fitted power-transform artifact.
    #[builder(into)]
    pub transform: PathBuf,
    /// Ordered feature-name list artifact.
    #[builder(into)]
    pub feature_names: PathBuf,
}

impl ArtifactPaths {
    /// Conventional layout: the three artifacts under one directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            transform: dir.join(TRANSFORM_FILE),
            feature_names: dir.join(FEATURE_NAMES_FILE),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything a request needs, loaded once at startup.
///
/// Read-only for the process lifetime; all contained types are `Send + Sync`,
/// so one bundle serves unsynchronized concurrent requests.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    catalog: SchemaCatalog,
    predictor: Predictor,
}

impl ModelBundle {
    /// Load and cross-validate the three artifacts.
    ///
    /// The artifacts carry no version markers, so agreement is checked the
    /// only way it can be: all three must declare the same feature count,
    /// and each must pass its own structural validation.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let model: ModelArtifact = read_json(&paths.model)?;
        let transform: TransformArtifact = read_json(&paths.transform)?;
        let names: FeatureNamesArtifact = read_json(&paths.feature_names)?;

        if model.num_features != transform.lambdas.len()
            || model.num_features != names.names.len()
        {
            return Err(ArtifactError::FeatureCountMismatch {
                model: model.num_features,
                transform: transform.lambdas.len(),
                names: names.names.len(),
            });
        }

        let forest = forest_from_artifact(&model)?;
        let power_transform = transform_from_artifact(&transform)?;
        let catalog = SchemaCatalog::from_feature_names(names.names)?;
        let predictor = Predictor::new(power_transform, forest)?;

        debug!(
            n_features = catalog.n_features(),
            n_trees = predictor.forest().n_trees(),
            "model bundle loaded"
        );

        Ok(Self { catalog, predictor })
    }

    /// Assemble a bundle from already-built parts.
    ///
    /// The catalog and predictor must agree on feature count; disagreement
    /// is reported as [`ArtifactError::FeatureCountMismatch`].
    pub fn from_parts(
        catalog: SchemaCatalog,
        predictor: Predictor,
    ) -> Result<Self, ArtifactError> {
        if catalog.n_features() != predictor.n_features() {
            return Err(ArtifactError::FeatureCountMismatch {
                model: predictor.n_features(),
                transform: predictor.n_features(),
                names: catalog.n_features(),
            });
        }
        Ok(Self { catalog, predictor })
    }

    /// The schema catalog.
    #[inline]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// The inference engine.
    #[inline]
    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_conventional_names() {
        let paths = ArtifactPaths::in_dir("/opt/models");
        assert_eq!(paths.model, PathBuf::from("/opt/models/random_forest.json"));
        assert_eq!(
            paths.transform,
            PathBuf::from("/opt/models/power_transform.json")
        );
        assert_eq!(
            paths.feature_names,
            PathBuf::from("/opt/models/feature_names.json")
        );
    }

    #[test]
    fn builder_accepts_path_likes() {
        let paths = ArtifactPaths::builder()
            .model("m.json")
            .transform("t.json")
            .feature_names("f.json")
            .build();
        assert_eq!(paths.model, PathBuf::from("m.json"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let paths = ArtifactPaths::in_dir("/nonexistent-model-dir");
        assert!(matches!(
            ModelBundle::load(&paths).unwrap_err(),
            ArtifactError::Io { .. }
        ));
    }
}
