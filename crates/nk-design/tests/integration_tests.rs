//! Integration tests for nk-design.
//!
//! These tests build design matrices through the public `Dmatrix` API and
//! check shapes, column names and basis values against hand-computed cases.

use approx::assert_relative_eq;
use ndarray::{array, Array1};

use nk_design::prelude::*;

// ============================================================================
// Test Utilities
// ============================================================================

fn stage_knots() -> Vec<f64> {
    vec![0.0, 1.0, 2.0, 3.0, 10.0]
}

fn assert_rows_sum_to_one(dm: &DesignMatrix<f64>) {
    for row in dm.matrix().rows() {
        assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
    }
}

// ============================================================================
// Dmatrix Tests
// ============================================================================

#[test]
fn test_dmatrix_reference_shape() {
    let dm = Dmatrix::new(&stage_knots(), 3, "bs");
    let out = dm.transform(array![1.0, 2.0, 3.0].into_dyn().view()).unwrap();

    // 3 interior knots + order 4; "- 1" drops the model intercept only
    assert_eq!(out.shape(), &[3, 7]);
}

#[test]
fn test_dmatrix_partition_of_unity() {
    let dm = Dmatrix::new(&stage_knots(), 3, "bs");
    let x = dm
        .design_matrix(array![1.0, 1.25, 1.5, 2.0, 2.75, 3.0].view())
        .unwrap();

    assert_rows_sum_to_one(&x);
    assert!(x.matrix().iter().all(|&v| v >= 0.0));
}

#[test]
fn test_dmatrix_column_names() {
    let dm = Dmatrix::new(&stage_knots(), 3, "bs");
    let x = dm.design_matrix(array![1.0, 2.0, 3.0].view()).unwrap();

    let names: Vec<String> = (0..7)
        .map(|i| format!("bs(stage, knots=knots, degree=3, include_intercept=True)[{i}]"))
        .collect();
    assert_eq!(x.column_names(), names.as_slice());
}

#[test]
fn test_dmatrix_outer_boundary_knots() {
    let config =
        DmatrixConfig::new(vec![0.0, 5.0, 10.0], 2, "bs").with_boundary(BoundaryKnots::Outer);
    let dm = Dmatrix::from_config(config);

    let x = dm
        .design_matrix(array![0.0, 2.5, 5.0, 7.5, 10.0].view())
        .unwrap();

    // 1 interior knot + order 3
    assert_eq!(x.ncols(), 4);
    assert_rows_sum_to_one(&x);

    let first = x.matrix().row(0).to_vec();
    let last = x.matrix().row(4).to_vec();
    assert_eq!(first, vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(last, vec![0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_dmatrix_outer_boundary_independent_of_data_range() {
    let config =
        DmatrixConfig::new(vec![0.0, 5.0, 10.0], 2, "bs").with_boundary(BoundaryKnots::Outer);
    let outer = Dmatrix::from_config(config);

    let narrow = outer.design_matrix(array![4.0, 6.0].view()).unwrap();
    let wide = outer
        .design_matrix(array![0.0, 4.0, 6.0, 10.0].view())
        .unwrap();

    for (a, b) in narrow.matrix().row(0).iter().zip(wide.matrix().row(1).iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_dmatrix_outer_rejects_data_beyond_knots() {
    let config =
        DmatrixConfig::new(vec![0.0, 5.0, 10.0], 2, "bs").with_boundary(BoundaryKnots::Outer);
    let dm = Dmatrix::from_config(config);

    let err = dm.design_matrix(array![1.0, 11.0].view()).unwrap_err();
    assert_eq!(
        err,
        FormulaError::DataOutsideKnots {
            value: 11.0,
            lower: 0.0,
            upper: 10.0
        }
    );
}

#[test]
fn test_dmatrix_data_bounds_reject_knot_outside_range() {
    let dm = Dmatrix::new(&stage_knots(), 3, "bs");

    // Boundary knots come from the data range [1.5, 2.5]
    let err = dm.design_matrix(array![1.5, 2.5].view()).unwrap_err();
    assert_eq!(
        err,
        FormulaError::KnotBelowLowerBound {
            knot: 1.0,
            bound: 1.5
        }
    );
}

#[test]
fn test_dmatrix_unknown_form() {
    let dm = Dmatrix::new(&stage_knots(), 3, "natural");
    let err = dm.design_matrix(array![1.0, 2.0].view()).unwrap_err();
    assert_eq!(err, FormulaError::UnknownFunction("natural".to_string()));
}

#[test]
fn test_dmatrix_missing_stage_values() {
    let dm = Dmatrix::new(&stage_knots(), 3, "bs");
    let err = dm.design_matrix(array![1.0, f64::NAN, 3.0].view()).unwrap_err();
    assert_eq!(err, FormulaError::MissingValues("stage".to_string()));
}

#[test]
fn test_dmatrix_rejects_nan_interior_knot() {
    let dm = Dmatrix::new(&[0.0, f64::NAN, 10.0], 2, "bs");
    let err = dm.design_matrix(array![0.0, 5.0, 10.0].view()).unwrap_err();
    assert_eq!(
        err,
        FormulaError::InvalidArgument {
            function: "bs".to_string(),
            argument: "knots".to_string(),
            expected: "finite values",
        }
    );
}

#[test]
fn test_dmatrix_oversized_degree_is_an_error() {
    let stage = array![1.0, 2.0, 3.0];
    for degree in [usize::MAX, 1 << 60] {
        let dm = Dmatrix::new(&stage_knots(), degree, "bs");
        let err = dm.design_matrix(stage.view()).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::InvalidArgument { ref argument, .. } if argument == "degree"
        ));
    }

    let bindings = Bindings::new().with_vector("x", stage);
    let err = SplineFormulaEvaluator
        .evaluate("bs(x, knots=None, df=None, degree=1e15)", &bindings)
        .unwrap_err();
    assert!(matches!(err, FormulaError::MissingKnotSpec(_)));

    let err = SplineFormulaEvaluator
        .evaluate("bs(x, df=4, degree=1e18)", &bindings)
        .unwrap_err();
    assert!(matches!(err, FormulaError::DfTooSmall { .. }));
}

#[test]
fn test_dmatrix_as_transform_object() {
    let transforms: Vec<Box<dyn Transform<f64>>> = vec![
        Box::new(Dmatrix::new(&stage_knots(), 3, "bs")),
        Box::new(Dmatrix::new(&stage_knots(), 1, "bs")),
    ];

    let stage = array![1.0, 2.0, 3.0].into_dyn();
    let widths: Vec<usize> = transforms
        .iter()
        .map(|t| t.transform(stage.view()).unwrap().shape()[1])
        .collect();
    assert_eq!(widths, vec![7, 5]);
}

// ============================================================================
// Formula Evaluator Tests
// ============================================================================

#[test]
fn test_evaluator_df_with_intercept_term() {
    let bindings = Bindings::new().with_vector("x", Array1::linspace(0.0, 4.0, 9));
    let dm = SplineFormulaEvaluator
        .evaluate("bs(x, df=6)", &bindings)
        .unwrap();

    assert_eq!(dm.ncols(), 7);
    assert_eq!(dm.column_names()[0], "Intercept");
    assert!(dm.matrix().column(0).iter().all(|&v| v == 1.0));
}

#[test]
fn test_evaluator_mixed_terms() {
    let bindings = Bindings::new()
        .with_vector("x", array![0.0, 1.0, 2.0])
        .with_vector("w", array![5.0, 6.0, 7.0]);
    let dm = SplineFormulaEvaluator
        .evaluate("w + bs(x, knots=None, df=3, degree=1) + 0", &bindings)
        .unwrap();

    assert_eq!(dm.column_names()[0], "w");
    assert_eq!(dm.ncols(), 1 + 3);
    assert_eq!(dm.matrix().column(0).to_vec(), vec![5.0, 6.0, 7.0]);
}

#[test]
fn test_evaluator_argument_errors() {
    let bindings = Bindings::new().with_vector("x", array![0.0, 1.0, 2.0]);

    let err = SplineFormulaEvaluator
        .evaluate("bs(x, df=4, spline_order=3)", &bindings)
        .unwrap_err();
    assert_eq!(
        err,
        FormulaError::UnexpectedArgument {
            function: "bs".to_string(),
            argument: "spline_order".to_string()
        }
    );

    let err = SplineFormulaEvaluator
        .evaluate("bs(x, df=4, df=5)", &bindings)
        .unwrap_err();
    assert!(matches!(err, FormulaError::DuplicateArgument { .. }));

    let err = SplineFormulaEvaluator.evaluate("bs(x)", &bindings).unwrap_err();
    assert_eq!(err, FormulaError::MissingKnotSpec("bs".to_string()));

    let err = SplineFormulaEvaluator
        .evaluate("bs(x, df=4, degree=-1)", &bindings)
        .unwrap_err();
    assert!(matches!(err, FormulaError::InvalidArgument { .. }));
}

#[test]
fn test_evaluator_parse_error() {
    let bindings = Bindings::new().with_vector("x", array![0.0, 1.0]);
    let err = SplineFormulaEvaluator
        .evaluate("bs(x, df=4", &bindings)
        .unwrap_err();
    assert!(matches!(err, FormulaError::Parse { position: 10, .. }));
}
