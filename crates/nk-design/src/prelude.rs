//! Prelude for nk-design.

pub use crate::dmatrix::{BoundaryKnots, Dmatrix, DmatrixConfig};
pub use crate::evaluator::{Binding, Bindings, DesignEvaluator, DesignMatrix, SplineFormulaEvaluator};

pub use nk_core::error::{FormulaError, FormulaResult};
pub use nk_core::traits::Transform;
