//! Log-Z Transform.
//!
//! Takes the natural log of the data, then standardizes the log values with
//! an inner [`ZTransform`] fitted on the log of the sample.

use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension};

use nk_core::{
    error::TransformResult,
    num::Real,
    traits::{InvertibleTransform, Transform},
};

use crate::z_transform::{ZTransform, ZTransformConfig};

/// Log-Z Transform.
///
/// Computes z = (ln(x) - μ) / σ where μ and σ are the moments of ln(sample).
///
/// # Edge Cases
///
/// - x < 0: ln(x) is NaN; skipped in the fitting sample, propagated on transform
/// - x = 0: ln(x) is -inf; not skipped, so fitted moments become non-finite
/// - Values `<= 0` are outside the round-trip domain
#[derive(Debug, Clone)]
pub struct LogZTransform<T: Real> {
    inner: ZTransform<T>,
}

impl<T: Real> LogZTransform<T> {
    /// Fit on a sample of positive values.
    ///
    /// # Errors
    ///
    /// Returns an error if `sample` is 0-dimensional.
    pub fn fit<S, D>(sample: &ArrayBase<S, D>) -> TransformResult<Self>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        Self::fit_with_config(sample, ZTransformConfig::default())
    }

    /// Fit with an explicit configuration for the inner z-transform.
    ///
    /// # Errors
    ///
    /// Returns an error if `sample` is 0-dimensional.
    pub fn fit_with_config<S, D>(
        sample: &ArrayBase<S, D>,
        config: ZTransformConfig,
    ) -> TransformResult<Self>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        let log_sample = sample.mapv(T::ln).into_dyn();

        let non_positive = sample.iter().filter(|&&v| v <= T::ZERO).count();
        if non_positive > 0 {
            tracing::warn!(
                non_positive,
                "log-z transform fitted on non-positive values; their logarithms are NaN or -inf"
            );
        }

        let inner = ZTransform::fit_view(log_sample.view(), config)?;
        Ok(Self { inner })
    }

    /// Mean of the log-sample, one entry per lane.
    pub fn mean(&self) -> ArrayViewD<'_, T> {
        self.inner.mean()
    }

    /// Standard deviation of the log-sample, one entry per lane.
    pub fn std(&self) -> ArrayViewD<'_, T> {
        self.inner.std()
    }

    /// The z-transform applied on the log scale.
    pub fn inner(&self) -> &ZTransform<T> {
        &self.inner
    }
}

impl<T: Real> Transform<T> for LogZTransform<T> {
    fn transform(&self, x: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        tracing::trace!(shape = ?x.shape(), "log-z transform forward");
        let log_x = x.mapv(T::ln);
        self.inner.transform(log_x.view())
    }
}

impl<T: Real> InvertibleTransform<T> for LogZTransform<T> {
    fn untransform(&self, z: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        tracing::trace!(shape = ?z.shape(), "log-z transform inverse");
        let log_x = self.inner.untransform(z)?;
        Ok(log_x.mapv_into(T::exp))
    }
}
