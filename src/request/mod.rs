//! Prediction request validation.
//!
//! Requests arrive from an outer web layer as raw string fields. [`validate`]
//! turns a [`RawRequest`] into a typed [`ValidatedInput`] or a
//! [`ValidationError`] precise enough for the caller to correct and resubmit.
//!
//! Validation is deterministic and has no side effects. All negative numeric
//! fields are collected into a single error rather than failing on the first,
//! so a caller sees every violation in one pass. Dictionary membership of the
//! categorical fields is deliberately not enforced here: the encoder maps
//! unknown labels to the all-zero indicator pattern for their group.

use std::fmt;

/// Earliest year a request may reference.
pub const YEAR_MIN: i32 = 1997;
/// Latest year a request may reference.
pub const YEAR_MAX: i32 = 2030;

// =============================================================================
// Request Types
// =============================================================================

/// A prediction request exactly as submitted: every field still a string.
///
/// Created per incoming request and discarded after validation.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub year: String,
    pub crop: String,
    pub season: String,
    pub state: String,
    pub area: String,
    pub production: String,
    pub annual_rainfall: String,
    pub fertilizer: String,
    pub pesticide: String,
}

/// A request that passed validation: typed, trimmed, in range.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    /// Year in `[YEAR_MIN, YEAR_MAX]`.
    pub year: i32,
    /// Crop label, trimmed.
    pub crop: String,
    /// Season label, trimmed.
    pub season: String,
    /// State label, trimmed.
    pub state: String,
    /// Cultivated area, >= 0.
    pub area: f64,
    /// Total production, >= 0.
    pub production: f64,
    /// Annual rainfall, >= 0.
    pub annual_rainfall: f64,
    /// Fertilizer usage, >= 0.
    pub fertilizer: f64,
    /// Pesticide usage, >= 0.
    pub pesticide: f64,
}

// =============================================================================
// ValidationError
// =============================================================================

/// One numeric field that was below zero, with the offending value.
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeField {
    /// Display name of the field.
    pub field: &'static str,
    /// The submitted value.
    pub value: f64,
}

impl fmt::Display for NegativeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.field, self.value)
    }
}

/// The full set of negative numeric fields from one request.
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeFields(pub Vec<NegativeField>);

impl fmt::Display for NegativeFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Why a raw request was rejected.
///
/// All variants are recoverable: the caller may correct the named field(s)
/// and resubmit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A numeric field did not parse as a finite number.
    #[error("{field} must be a valid number, got {value:?}")]
    Unparsable { field: &'static str, value: String },

    /// Year was outside the supported range.
    #[error("Year must be between 1997 and 2030, got {0}")]
    YearOutOfRange(i32),

    /// One or more numeric fields were negative; every violation is listed.
    #[error("fields cannot be negative: {0}")]
    NegativeValues(NegativeFields),

    /// A required categorical field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
}

// =============================================================================
// Validation
// =============================================================================

fn parse_year(value: &str) -> Result<i32, ValidationError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| ValidationError::Unparsable {
            field: "Year",
            value: value.to_string(),
        })
}

fn parse_quantity(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    let parsed = value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    parsed.ok_or_else(|| ValidationError::Unparsable {
        field,
        value: value.to_string(),
    })
}

fn require_label(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Validate a raw request.
///
/// Checks run in a fixed order: year (parse, then range), the five numeric
/// fields (parse, then a batched non-negativity check), then presence of the
/// categorical labels. Identical input always yields the identical outcome.
pub fn validate(raw: &RawRequest) -> Result<ValidatedInput, ValidationError> {
    let year = parse_year(&raw.year)?;
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(ValidationError::YearOutOfRange(year));
    }

    let area = parse_quantity("Area", &raw.area)?;
    let production = parse_quantity("Production", &raw.production)?;
    let annual_rainfall = parse_quantity("Annual Rainfall", &raw.annual_rainfall)?;
    let fertilizer = parse_quantity("Fertilizer", &raw.fertilizer)?;
    let pesticide = parse_quantity("Pesticide", &raw.pesticide)?;

    let negative: Vec<NegativeField> = [
        ("Area", area),
        ("Production", production),
        ("Annual Rainfall", annual_rainfall),
        ("Fertilizer", fertilizer),
        ("Pesticide", pesticide),
    ]
    .into_iter()
    .filter(|(_, value)| *value < 0.0)
    .map(|(field, value)| NegativeField { field, value })
    .collect();
    if !negative.is_empty() {
        return Err(ValidationError::NegativeValues(NegativeFields(negative)));
    }

    Ok(ValidatedInput {
        year,
        crop: require_label("Crop", &raw.crop)?,
        season: require_label("Season", &raw.season)?,
        state: require_label("State", &raw.state)?,
        area,
        production,
        annual_rainfall,
        fertilizer,
        pesticide,
    })
}
