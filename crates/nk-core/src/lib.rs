//! # nk-core
//!
//! Core types and traits for the normkit transform library.
//!
//! This crate provides the foundational abstractions used throughout the workspace:
//!
//! - [`Real`] - Trait for numeric element types (f32/f64)
//! - [`Transform`] and [`InvertibleTransform`] - Forward and invertible transform traits
//! - [`TransformError`] and [`FormulaError`] - Structured error types
//! - [`stats`] - NaN-skipping reductions along the sample axis
//! - [`ops`] - Broadcasting of fitted parameters over inputs
//!
//! ## Example
//!
//! ```rust
//! use ndarray::array;
//! use nk_core::prelude::*;
//!
//! let sample = array![[1.0, 10.0], [3.0, f64::NAN]];
//! let mean = nan_mean(sample.view().into_dyn()).unwrap();
//! assert_eq!(mean.as_slice().unwrap(), &[2.0, 10.0]);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod num;
pub mod ops;
pub mod prelude;
pub mod stats;
pub mod traits;

// Re-export core types at crate root
pub use error::{FormulaError, FormulaResult, TransformError, TransformResult};
pub use num::Real;
pub use traits::{InvertibleTransform, Transform};
