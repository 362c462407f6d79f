//! # nk-design
//!
//! Spline design matrices for the normkit library.
//!
//! A [`Dmatrix`] holds a knot sequence and a formula template over a `stage`
//! variable. Each call binds the input and the interior knots, then hands the
//! formula to a [`DesignEvaluator`]:
//!
//! - [`formula`] - Parser for the formula mini-language
//! - [`evaluator`] - Name bindings, design matrices and the built-in evaluator
//! - [`bspline`] - The `bs` B-spline basis
//!
//! # Example
//!
//! ```rust
//! use ndarray::array;
//! use nk_design::prelude::*;
//!
//! let bindings = Bindings::new().with_vector("x", array![0.0, 0.5, 1.0]);
//! let dm = SplineFormulaEvaluator
//!     .evaluate("bs(x, df=4)", &bindings)
//!     .unwrap();
//!
//! assert_eq!(dm.column_names()[0], "Intercept");
//! assert_eq!(dm.ncols(), 5);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod bspline;
pub mod dmatrix;
pub mod evaluator;
pub mod formula;
pub mod prelude;

pub use bspline::{BSplineBasis, BsSpec};
pub use dmatrix::{BoundaryKnots, Dmatrix, DmatrixConfig};
pub use evaluator::{Binding, Bindings, DesignEvaluator, DesignMatrix, SplineFormulaEvaluator};
pub use formula::Formula;
