//! Schema-driven feature encoding.
//!
//! [`encode`] turns a [`ValidatedInput`] into the exact numeric vector the
//! trained model expects. Instead of expanding the categorical fields into
//! one-hot columns and then reconciling against the trained column set, the
//! encoder walks the catalog's frozen slot list directly and asks, per slot,
//! what value belongs there. Alignment with the trained order therefore holds
//! by construction, for any input, and the encoder cannot fail.
//!
//! A categorical value that owns no indicator slot (the group's reference
//! level, or a label the model never saw) contributes zero to every slot in
//! its group.

use ndarray::{Array1, ArrayView1};

use crate::catalog::{FeatureSlot, SchemaCatalog};
use crate::request::ValidatedInput;

/// A numeric vector aligned to the catalog's frozen feature order.
///
/// Length and slot order always equal the catalog's list. Constructed fresh
/// per request and consumed once by the predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array1<f32>,
}

impl FeatureVector {
    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the vector has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read-only view of the values.
    #[inline]
    pub fn view(&self) -> ArrayView1<'_, f32> {
        self.values.view()
    }

    /// The values as a contiguous slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        // Always built from a Vec, so the backing storage is contiguous.
        self.values.as_slice().expect("feature vector is contiguous")
    }

    /// Consume the vector, yielding the underlying array.
    #[inline]
    pub fn into_inner(self) -> Array1<f32> {
        self.values
    }
}

/// Encode a validated input against the catalog's frozen feature order.
pub fn encode(catalog: &SchemaCatalog, input: &ValidatedInput) -> FeatureVector {
    let crop = input.crop.trim();
    let season = input.season.trim();
    let state = input.state.trim();

    let values: Vec<f32> = catalog
        .slots()
        .iter()
        .map(|slot| match slot {
            FeatureSlot::Area => input.area as f32,
            FeatureSlot::Production => input.production as f32,
            FeatureSlot::AnnualRainfall => input.annual_rainfall as f32,
            FeatureSlot::Fertilizer => input.fertilizer as f32,
            FeatureSlot::Pesticide => input.pesticide as f32,
            FeatureSlot::Crop(label) => indicator(label, crop),
            FeatureSlot::Season(label) => indicator(label, season),
            FeatureSlot::State(label) => indicator(label, state),
        })
        .collect();

    FeatureVector {
        values: Array1::from_vec(values),
    }
}

#[inline]
fn indicator(slot_label: &str, value: &str) -> f32 {
    if slot_label == value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::dictionaries;
    use crate::catalog::CONTINUOUS_FEATURES;

    fn small_catalog() -> SchemaCatalog {
        let names = vec![
            "Area".to_string(),
            "Production".to_string(),
            "Annual_Rainfall".to_string(),
            "Fertilizer".to_string(),
            "Pesticide".to_string(),
            "Crop_Rice".to_string(),
            "Crop_Wheat".to_string(),
            "Season_Kharif".to_string(),
            "Season_Rabi".to_string(),
            "State_Punjab".to_string(),
        ];
        SchemaCatalog::from_feature_names(names).unwrap()
    }

    fn input(crop: &str, season: &str, state: &str) -> ValidatedInput {
        ValidatedInput {
            year: 2020,
            crop: crop.to_string(),
            season: season.to_string(),
            state: state.to_string(),
            area: 100.0,
            production: 250.0,
            annual_rainfall: 800.0,
            fertilizer: 50.0,
            pesticide: 2.0,
        }
    }

    #[test]
    fn vector_matches_frozen_order() {
        let catalog = small_catalog();
        let vector = encode(&catalog, &input("Rice", "Kharif", "Punjab"));
        assert_eq!(vector.len(), catalog.n_features());
        assert_eq!(
            vector.as_slice(),
            &[100.0, 250.0, 800.0, 50.0, 2.0, 1.0, 0.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn unknown_labels_encode_all_zero_for_their_group() {
        let catalog = small_catalog();
        let vector = encode(&catalog, &input("Quinoa", "Monsoon", "Atlantis"));
        assert_eq!(
            vector.as_slice(),
            &[100.0, 250.0, 800.0, 50.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn reference_level_encodes_all_zero() {
        // A label with no indicator slot of its own is the implicit reference
        // level of its group.
        let catalog = small_catalog();
        let vector = encode(&catalog, &input("Maize", "Summer", "Kerala"));
        assert!(vector.as_slice()[5..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn padded_labels_match_their_slot() {
        let catalog = small_catalog();
        let vector = encode(&catalog, &input("Rice", "Kharif     ", "Punjab"));
        assert_eq!(vector.as_slice()[7], 1.0);
    }

    #[test]
    fn every_dictionary_triple_aligns_with_production_list() {
        let mut names: Vec<String> =
            CONTINUOUS_FEATURES.iter().map(|s| s.to_string()).collect();
        names.extend(dictionaries::CROPS[1..].iter().map(|c| format!("Crop_{c}")));
        names.extend(dictionaries::SEASONS[1..].iter().map(|s| format!("Season_{s}")));
        names.extend(dictionaries::STATES[1..].iter().map(|s| format!("State_{s}")));
        let catalog = SchemaCatalog::from_feature_names(names).unwrap();

        for crop in dictionaries::CROPS {
            for season in dictionaries::SEASONS {
                for state in dictionaries::STATES {
                    let vector = encode(&catalog, &input(crop, season, state));
                    assert_eq!(vector.len(), catalog.n_features());
                    // Exactly one indicator set per group, or zero for the
                    // reference level.
                    let indicators = &vector.as_slice()[5..];
                    let ones = indicators.iter().filter(|&&v| v == 1.0).count();
                    let reference_hits = [
                        crop == &dictionaries::CROPS[0],
                        season == &dictionaries::SEASONS[0],
                        state == &dictionaries::STATES[0],
                    ]
                    .iter()
                    .filter(|&&hit| hit)
                    .count();
                    assert_eq!(ones, 3 - reference_hits);
                }
            }
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let catalog = small_catalog();
        let a = encode(&catalog, &input("Rice", "Kharif", "Punjab"));
        let b = encode(&catalog, &input("Rice", "Kharif", "Punjab"));
        assert_eq!(a, b);
    }
}
