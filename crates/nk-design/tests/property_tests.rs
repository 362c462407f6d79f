//! Property-based tests for nk-design.
//!
//! Spline bases with the intercept kept must form a non-negative partition of
//! unity over the whole knot range.

use ndarray::Array1;
use proptest::prelude::*;

use nk_design::prelude::*;

// ============================================================================
// Proptest Strategies
// ============================================================================

/// Generate sorted, strictly increasing knots spanning `[0, 100]`.
fn knot_sequence() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::btree_set(1u32..100, 0..6).prop_map(|inner| {
        let mut knots = vec![0.0];
        knots.extend(inner.into_iter().map(f64::from));
        knots.push(100.0);
        knots
    })
}

/// Generate stage values within `[0, 100]`.
fn stage_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=100.0, 1..30)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_outer_basis_is_partition_of_unity(
        knots in knot_sequence(),
        stage in stage_values(),
        degree in 0usize..5,
    ) {
        let config = DmatrixConfig::new(knots.clone(), degree, "bs")
            .with_boundary(BoundaryKnots::Outer);
        let dm = Dmatrix::from_config(config);

        let x = dm.design_matrix(Array1::from(stage.clone()).view()).unwrap();

        prop_assert_eq!(x.nrows(), stage.len());
        prop_assert_eq!(x.ncols(), knots.len() - 2 + degree + 1);
        for row in x.matrix().rows() {
            prop_assert!((row.sum() - 1.0).abs() < 1e-9);
            prop_assert!(row.iter().all(|&v| v >= -1e-12));
        }
    }

    #[test]
    fn prop_df_controls_column_count(
        stage in prop::collection::vec(-50.0f64..50.0, 2..40),
        df in 3usize..9,
    ) {
        let bindings = Bindings::new().with_vector("x", Array1::from(stage));
        let dm = SplineFormulaEvaluator
            .evaluate(&format!("bs(x, df={df}) - 1"), &bindings)
            .unwrap();

        prop_assert_eq!(dm.ncols(), df);
    }
}
