//! Prelude for nk-transforms.
//!
//! This module re-exports all commonly used types and traits.

pub use crate::log_z_transform::LogZTransform;
pub use crate::unit_transform::UnitTransform;
pub use crate::z_transform::{ZTransform, ZTransformConfig};

// Re-export core transform traits
pub use nk_core::traits::{InvertibleTransform, Transform};
