//! Unit Transform (scale by maximum).

use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension};

use nk_core::{
    error::TransformResult,
    num::Real,
    ops::zip_with,
    stats::nan_max,
    traits::{InvertibleTransform, Transform},
};

/// Unit Transform.
///
/// Scales values by the per-lane maximum of the fitting sample: u = x / max
///
/// # Edge Cases
///
/// - max = 0: not guarded; transform yields ±inf or NaN
/// - NaN in the fitting sample: skipped when computing max
#[derive(Debug, Clone)]
pub struct UnitTransform<T: Real> {
    max: ArrayD<T>,
}

impl<T: Real> UnitTransform<T> {
    /// Fit on a sample.
    ///
    /// # Errors
    ///
    /// Returns an error if `sample` is 0-dimensional.
    pub fn fit<S, D>(sample: &ArrayBase<S, D>) -> TransformResult<Self>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        let sample = sample.view().into_dyn();
        let max = nan_max(sample.view())?;

        let zero_scale = max.iter().filter(|&&m| m == T::ZERO).count();
        if zero_scale > 0 {
            tracing::warn!(
                zero_scale,
                lanes = max.len(),
                "unit transform fitted with zero maximum; transform will divide by zero"
            );
        }

        tracing::debug!(
            rows = sample.shape()[0],
            param_shape = ?max.shape(),
            "fitted unit transform"
        );

        Ok(Self { max })
    }

    /// Fitted maximum, one entry per lane.
    pub fn max(&self) -> ArrayViewD<'_, T> {
        self.max.view()
    }
}

impl<T: Real> Transform<T> for UnitTransform<T> {
    fn transform(&self, x: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        tracing::trace!(shape = ?x.shape(), "unit transform forward");
        zip_with(x, &self.max, |x, max| x / max)
    }
}

impl<T: Real> InvertibleTransform<T> for UnitTransform<T> {
    fn untransform(&self, u: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        tracing::trace!(shape = ?u.shape(), "unit transform inverse");
        zip_with(u, &self.max, |u, max| u * max)
    }
}
