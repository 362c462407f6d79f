//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits from nk-core.

// Core types
pub use crate::num::Real;

// Error types
pub use crate::error::{FormulaError, FormulaResult, TransformError, TransformResult};

// Traits
pub use crate::traits::{InvertibleTransform, Transform};

// Reductions
pub use crate::stats::{nan_max, nan_mean, nan_std};
