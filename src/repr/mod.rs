//! Frozen model representations.
//!
//! Runtime storage for the trained ensemble: structure-of-arrays trees and
//! the averaging forest over them. These types are immutable after artifact
//! loading and hold no request state, so they are shared freely across
//! concurrently executing requests.

pub mod forest;
pub mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{NodeId, Tree, TreeValidationError};
