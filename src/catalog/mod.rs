//! Immutable schema catalog.
//!
//! The catalog holds everything the encoder needs to produce a vector the
//! trained model understands: the three categorical dictionaries and the
//! frozen, ordered feature-name list captured at training time. It is built
//! once at startup and only ever read afterwards, so shared references are
//! safe across concurrently executing requests.
//!
//! Feature names are parsed into typed [`FeatureSlot`]s at construction.
//! A name that fits none of the known shapes is a construction error; there
//! is no degraded mode for a corrupt feature-name artifact.

use std::collections::{HashMap, HashSet};

pub mod dictionaries;

/// Canonical column names for the five continuous inputs, in their
/// training-time order.
pub const CONTINUOUS_FEATURES: [&str; 5] = [
    "Area",
    "Production",
    "Annual_Rainfall",
    "Fertilizer",
    "Pesticide",
];

const CROP_PREFIX: &str = "Crop_";
const SEASON_PREFIX: &str = "Season_";
const STATE_PREFIX: &str = "State_";

// =============================================================================
// CatalogError
// =============================================================================

/// Errors raised while building a [`SchemaCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The feature-name list was empty.
    #[error("feature-name list is empty")]
    EmptyFeatureList,

    /// A feature name matched neither a continuous column nor a one-hot
    /// indicator pattern.
    #[error("feature {index} ({name:?}) is not a recognized column name")]
    UnknownFeature { index: usize, name: String },

    /// The same feature name appeared twice.
    #[error("feature name {name:?} appears more than once")]
    DuplicateFeature { name: String },
}

// =============================================================================
// Dictionary
// =============================================================================

/// A fixed label → ordinal mapping for one categorical group.
///
/// Ordinals are the label's position in the training-time label set. The
/// mapping is immutable; lookups trim their argument so padded labels from
/// legacy form data still resolve.
#[derive(Debug, Clone)]
pub struct Dictionary {
    labels: &'static [&'static str],
    index: HashMap<&'static str, usize>,
}

impl Dictionary {
    fn new(labels: &'static [&'static str]) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| (label, i))
            .collect();
        Self { labels, index }
    }

    /// Number of labels in the group.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the group has no labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels, in ordinal order.
    #[inline]
    pub fn labels(&self) -> &'static [&'static str] {
        self.labels
    }

    /// Ordinal for a label, if present. The argument is trimmed first.
    pub fn ordinal(&self, label: &str) -> Option<usize> {
        self.index.get(label.trim()).copied()
    }

    /// Returns true if the (trimmed) label belongs to the group.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label.trim())
    }
}

// =============================================================================
// FeatureSlot
// =============================================================================

/// A single position in the trained feature order.
///
/// Continuous slots read one of the five numeric inputs directly. Indicator
/// slots are one-hot columns for a specific categorical label; a request
/// whose label matches none of a group's indicator slots encodes as all-zero
/// for that group (the group's reference level has no slot of its own).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSlot {
    /// Cultivated area.
    Area,
    /// Total production.
    Production,
    /// Annual rainfall.
    AnnualRainfall,
    /// Fertilizer usage.
    Fertilizer,
    /// Pesticide usage.
    Pesticide,
    /// One-hot indicator for a specific crop label.
    Crop(String),
    /// One-hot indicator for a specific season label.
    Season(String),
    /// One-hot indicator for a specific state label.
    State(String),
}

impl FeatureSlot {
    /// Parse a trained feature name into a slot.
    fn parse(name: &str) -> Option<Self> {
        match name {
            "Area" => return Some(Self::Area),
            "Production" => return Some(Self::Production),
            "Annual_Rainfall" => return Some(Self::AnnualRainfall),
            "Fertilizer" => return Some(Self::Fertilizer),
            "Pesticide" => return Some(Self::Pesticide),
            _ => {}
        }
        if let Some(label) = name.strip_prefix(CROP_PREFIX) {
            return Some(Self::Crop(label.trim().to_string()));
        }
        if let Some(label) = name.strip_prefix(SEASON_PREFIX) {
            return Some(Self::Season(label.trim().to_string()));
        }
        if let Some(label) = name.strip_prefix(STATE_PREFIX) {
            return Some(Self::State(label.trim().to_string()));
        }
        None
    }

    /// Returns true if this is a one-hot indicator slot.
    pub fn is_indicator(&self) -> bool {
        matches!(self, Self::Crop(_) | Self::Season(_) | Self::State(_))
    }
}

// =============================================================================
// SchemaCatalog
// =============================================================================

/// The frozen feature order plus the categorical dictionaries.
///
/// Constructed once from the trained feature-name list; read-only afterwards.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    feature_names: Vec<String>,
    slots: Vec<FeatureSlot>,
    crops: Dictionary,
    seasons: Dictionary,
    states: Dictionary,
}

impl SchemaCatalog {
    /// Build a catalog from the trained feature-name list.
    ///
    /// Names are parsed into [`FeatureSlot`]s in order. Fails on an empty
    /// list, an unrecognized name, or a duplicate name.
    pub fn from_feature_names(feature_names: Vec<String>) -> Result<Self, CatalogError> {
        if feature_names.is_empty() {
            return Err(CatalogError::EmptyFeatureList);
        }

        let mut slots = Vec::with_capacity(feature_names.len());
        let mut seen = HashSet::with_capacity(feature_names.len());
        for (index, name) in feature_names.iter().enumerate() {
            if !seen.insert(name.trim().to_string()) {
                return Err(CatalogError::DuplicateFeature { name: name.clone() });
            }
            let slot = FeatureSlot::parse(name).ok_or_else(|| CatalogError::UnknownFeature {
                index,
                name: name.clone(),
            })?;
            slots.push(slot);
        }

        Ok(Self {
            feature_names,
            slots,
            crops: Dictionary::new(dictionaries::CROPS),
            seasons: Dictionary::new(dictionaries::SEASONS),
            states: Dictionary::new(dictionaries::STATES),
        })
    }

    /// Number of features in the frozen order.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.slots.len()
    }

    /// The trained feature names, in frozen order.
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The parsed feature slots, in frozen order.
    #[inline]
    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    /// The crop dictionary.
    #[inline]
    pub fn crops(&self) -> &Dictionary {
        &self.crops
    }

    /// The season dictionary.
    #[inline]
    pub fn seasons(&self) -> &Dictionary {
        &self.seasons
    }

    /// The state dictionary.
    #[inline]
    pub fn states(&self) -> &Dictionary {
        &self.states
    }
}
