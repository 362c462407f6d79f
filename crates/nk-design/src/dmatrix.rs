//! Spline design matrices over a `stage` variable.

use ndarray::{s, Array1, ArrayD, ArrayView1, ArrayViewD, Ix1};

use nk_core::{
    error::{FormulaResult, TransformResult},
    num::Real,
    traits::Transform,
};

use crate::evaluator::{Bindings, DesignEvaluator, DesignMatrix, SplineFormulaEvaluator};

/// Data variable bound to the input of [`Dmatrix`].
pub const STAGE: &str = "stage";
/// Name bound to the interior knots.
pub const KNOTS: &str = "knots";
/// Name bound to the lower boundary knot with [`BoundaryKnots::Outer`].
pub const LOWER_BOUND: &str = "lower_bound";
/// Name bound to the upper boundary knot with [`BoundaryKnots::Outer`].
pub const UPPER_BOUND: &str = "upper_bound";

/// Where the spline's boundary knots come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundaryKnots {
    /// Range of the `stage` values passed to each call.
    #[default]
    Data,
    /// First and last supplied knots.
    Outer,
}

/// Configuration for [`Dmatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct DmatrixConfig<T: Real> {
    /// Knot sequence including both outer knots.
    pub knots: Vec<T>,
    /// Spline degree.
    pub degree: usize,
    /// Basis function name used in the formula.
    pub form: String,
    /// Boundary knot source.
    pub boundary: BoundaryKnots,
}

impl<T: Real> DmatrixConfig<T> {
    /// Create a configuration with data-driven boundary knots.
    pub fn new(knots: Vec<T>, degree: usize, form: impl Into<String>) -> Self {
        Self {
            knots,
            degree,
            form: form.into(),
            boundary: BoundaryKnots::default(),
        }
    }

    /// Set the boundary knot source.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryKnots) -> Self {
        self.boundary = boundary;
        self
    }
}

/// Design matrix builder for a spline over `stage`.
///
/// Holds the formula
/// `<form>(stage, knots=knots, degree=<degree>, include_intercept=True) - 1`
/// and evaluates it for each input.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use nk_design::Dmatrix;
///
/// let dm = Dmatrix::new(&[0.0, 1.0, 2.0, 3.0, 10.0], 3, "bs");
/// let x = dm.design_matrix(array![1.0, 2.0, 3.0].view()).unwrap();
/// assert_eq!((x.nrows(), x.ncols()), (3, 7));
/// ```
#[derive(Debug, Clone)]
pub struct Dmatrix<T: Real, E = SplineFormulaEvaluator> {
    formula: String,
    knots: Array1<T>,
    boundary: BoundaryKnots,
    evaluator: E,
}

impl<T: Real> Dmatrix<T> {
    /// Create a builder with data-driven boundary knots.
    pub fn new(knots: &[T], degree: usize, form: &str) -> Self {
        Self::from_config(DmatrixConfig::new(knots.to_vec(), degree, form))
    }

    /// Create a builder from a configuration.
    pub fn from_config(config: DmatrixConfig<T>) -> Self {
        let bounds = match config.boundary {
            BoundaryKnots::Data => String::new(),
            BoundaryKnots::Outer => {
                format!(", {LOWER_BOUND}={LOWER_BOUND}, {UPPER_BOUND}={UPPER_BOUND}")
            }
        };
        let formula = format!(
            "{}({STAGE}, {KNOTS}={KNOTS}, degree={}, include_intercept=True{bounds}) - 1",
            config.form, config.degree
        );

        tracing::debug!(
            formula = %formula,
            knots = config.knots.len(),
            boundary = ?config.boundary,
            "built design matrix formula"
        );

        Self {
            formula,
            knots: Array1::from(config.knots),
            boundary: config.boundary,
            evaluator: SplineFormulaEvaluator,
        }
    }
}

impl<T: Real, E: DesignEvaluator<T>> Dmatrix<T, E> {
    /// Replace the formula evaluator.
    pub fn with_evaluator<E2: DesignEvaluator<T>>(self, evaluator: E2) -> Dmatrix<T, E2> {
        Dmatrix {
            formula: self.formula,
            knots: self.knots,
            boundary: self.boundary,
            evaluator,
        }
    }

    /// The formula text.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// The knot sequence as supplied.
    pub fn knots(&self) -> ArrayView1<'_, T> {
        self.knots.view()
    }

    /// All knots except the first and last.
    pub fn interior_knots(&self) -> ArrayView1<'_, T> {
        match self.knots.len() {
            0..=2 => self.knots.slice(s![0..0]),
            n => self.knots.slice(s![1..n - 1]),
        }
    }

    /// Names visible to the formula for a given `stage`.
    pub fn bindings(&self, stage: ArrayView1<'_, T>) -> Bindings<T> {
        let mut bindings = Bindings::new();
        bindings.insert_vector(STAGE, stage.to_owned());
        bindings.insert_vector(KNOTS, self.interior_knots().to_owned());

        if self.boundary == BoundaryKnots::Outer {
            if let (Some(&lower), Some(&upper)) = (self.knots.first(), self.knots.last()) {
                bindings.insert_scalar(LOWER_BOUND, lower);
                bindings.insert_scalar(UPPER_BOUND, upper);
            }
        }
        bindings
    }

    /// Evaluate the design matrix for `stage`.
    ///
    /// # Errors
    ///
    /// Returns whatever [`FormulaError`](nk_core::FormulaError) the evaluator
    /// raises, such as an unknown basis function or data outside the knots.
    pub fn design_matrix(&self, stage: ArrayView1<'_, T>) -> FormulaResult<DesignMatrix<T>> {
        tracing::trace!(rows = stage.len(), "evaluating design matrix");
        self.evaluator.evaluate(&self.formula, &self.bindings(stage))
    }
}

impl<T: Real, E: DesignEvaluator<T>> Transform<T> for Dmatrix<T, E> {
    fn transform(&self, x: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        let stage = x.into_dimensionality::<Ix1>()?;
        Ok(self.design_matrix(stage)?.into_matrix().into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use nk_core::{FormulaError, TransformError};

    #[test]
    fn test_formula_template() {
        let dm = Dmatrix::new(&[0.0, 1.0, 2.0, 3.0, 10.0], 3, "bs");
        assert_eq!(
            dm.formula(),
            "bs(stage, knots=knots, degree=3, include_intercept=True) - 1"
        );
    }

    #[test]
    fn test_outer_formula_template() {
        let config = DmatrixConfig::new(vec![0.0, 5.0, 10.0], 2, "bs")
            .with_boundary(BoundaryKnots::Outer);
        let dm = Dmatrix::from_config(config);
        assert_eq!(
            dm.formula(),
            "bs(stage, knots=knots, degree=2, include_intercept=True, \
             lower_bound=lower_bound, upper_bound=upper_bound) - 1"
        );

        let bindings = dm.bindings(array![1.0].view());
        assert_eq!(
            bindings.names().collect::<Vec<_>>(),
            vec!["stage", "knots", "lower_bound", "upper_bound"]
        );
    }

    #[test]
    fn test_interior_knots() {
        let dm = Dmatrix::new(&[0.0, 1.0, 2.0, 3.0, 10.0], 3, "bs");
        assert_eq!(dm.interior_knots().to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(dm.knots().len(), 5);

        let short = Dmatrix::new(&[0.0, 1.0], 3, "bs");
        assert!(short.interior_knots().is_empty());

        let empty = Dmatrix::<f64>::new(&[], 3, "bs");
        assert!(empty.interior_knots().is_empty());
    }

    #[test]
    fn test_design_matrix_shape_and_names() {
        let dm = Dmatrix::new(&[0.0, 1.0, 2.0, 3.0, 10.0], 3, "bs");
        let x = dm.design_matrix(array![1.0, 2.0, 3.0].view()).unwrap();

        assert_eq!((x.nrows(), x.ncols()), (3, 7));
        assert_eq!(
            x.column_names()[0],
            "bs(stage, knots=knots, degree=3, include_intercept=True)[0]"
        );
        for row in x.matrix().rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_requires_vector() {
        let dm = Dmatrix::new(&[0.0, 1.0, 2.0, 3.0, 10.0], 3, "bs");

        let out = dm.transform(array![1.0, 2.0, 3.0].into_dyn().view()).unwrap();
        assert_eq!(out.shape(), &[3, 7]);

        let err = dm
            .transform(array![[1.0, 2.0]].into_dyn().view())
            .unwrap_err();
        assert!(matches!(err, TransformError::Shape(_)));
    }

    #[test]
    fn test_unknown_form() {
        let dm = Dmatrix::new(&[0.0, 1.0, 2.0], 3, "cr");
        let err = dm.design_matrix(array![0.5].view()).unwrap_err();
        assert_eq!(err, FormulaError::UnknownFunction("cr".to_string()));

        let err = dm.transform(array![0.5].into_dyn().view()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Formula(FormulaError::UnknownFunction(_))
        ));
    }

    struct ConstantEvaluator;

    impl DesignEvaluator<f64> for ConstantEvaluator {
        fn evaluate(
            &self,
            _formula: &str,
            bindings: &Bindings<f64>,
        ) -> FormulaResult<DesignMatrix<f64>> {
            crate::evaluator::SplineFormulaEvaluator.evaluate("stage", bindings)
        }
    }

    #[test]
    fn test_custom_evaluator() {
        let dm = Dmatrix::new(&[0.0, 1.0], 3, "bs").with_evaluator(ConstantEvaluator);
        let x = dm.design_matrix(array![4.0, 5.0].view()).unwrap();
        assert_eq!(x.column_names(), &["Intercept", "stage"]);
        assert_eq!(x.into_matrix(), array![[1.0, 4.0], [1.0, 5.0]]);
    }
}
