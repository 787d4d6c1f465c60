//! cropcast: crop-yield prediction pipeline.
//!
//! Turns a raw agronomic request (crop, season, state, year, and five
//! continuous measurements) into a yield estimate from a frozen
//! random-forest model, and persists each request/result pair for later
//! analytics. The chain is Validator → Encoder → Inference → Persistence;
//! every stage before the durable write is pure.
//!
//! # Key Types
//!
//! - [`ModelBundle`] / [`ArtifactPaths`] - Loading the three frozen artifacts
//! - [`PredictionPipeline`] - Running requests end to end
//! - [`SchemaCatalog`] - Dictionaries and the frozen feature order
//! - [`RawRequest`] / [`ValidatedInput`] - Request validation
//! - [`PredictionStore`] - Schema-negotiated SQLite persistence
//!
//! # Running a Request
//!
//! Load a [`ModelBundle`] once at startup, wrap it in a
//! [`PredictionPipeline`], and call
//! [`predict_and_store`](PredictionPipeline::predict_and_store) per request.
//! The bundle is read-only and shared freely across threads.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod artifact;
pub mod catalog;
pub mod encode;
pub mod inference;
pub mod pipeline;
pub mod repr;
pub mod request;
pub mod store;
pub mod testing;
pub mod transform;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Startup types
pub use artifact::{ArtifactError, ArtifactPaths, ModelBundle};

// Request handling
pub use pipeline::{PredictError, PredictOutcome, Prediction, PredictionPipeline};
pub use request::{RawRequest, ValidatedInput, ValidationError};

// Schema and encoding
pub use catalog::{CatalogError, Dictionary, FeatureSlot, SchemaCatalog};
pub use encode::{encode, FeatureVector};

// Inference
pub use inference::{Predictor, SchemaMismatchError};

// Persistence
pub use store::{PredictionRecord, PredictionStore, StoreError, WritePlan};

// Shared utilities
pub use utils::Parallelism;
