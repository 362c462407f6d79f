//! # nk-transforms
//!
//! Invertible normalization transforms for the normkit library.
//!
//! This crate provides transforms that are fitted once on a reference sample
//! and then map new data to a normalized scale and back:
//!
//! - `ZTransform`: Standardize by mean and standard deviation
//! - `UnitTransform`: Scale by the maximum
//! - `LogZTransform`: Natural log followed by standardization
//!
//! Axis 0 of the fitting sample is the sample axis; parameters are computed
//! per lane with NaN entries skipped.
//!
//! # Example
//!
//! ```rust
//! use ndarray::array;
//! use nk_transforms::prelude::*;
//!
//! let z: ZTransform<f64> = ZTransform::fit(&array![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(z.transform_value(3.0).unwrap(), 0.0);
//!
//! let scaled = z.transform(array![1.0, 5.0].into_dyn().view()).unwrap();
//! let restored = z.untransform(scaled.view()).unwrap();
//! assert!((restored.iter().last().unwrap() - 5.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod log_z_transform;
mod unit_transform;
mod z_transform;

pub mod prelude;

pub use log_z_transform::LogZTransform;
pub use unit_transform::UnitTransform;
pub use z_transform::{ZTransform, ZTransformConfig};
