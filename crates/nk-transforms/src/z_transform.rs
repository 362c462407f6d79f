//! Z Transform (standardize by moments).
//!
//! Standardizes values by removing the mean and scaling by the standard
//! deviation, both computed along the sample axis with NaN entries skipped.

use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension};

use nk_core::{
    error::TransformResult,
    num::Real,
    ops::zip_with2,
    stats::{nan_mean, nan_std},
    traits::{InvertibleTransform, Transform},
};

/// Configuration for ZTransform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZTransformConfig {
    /// Delta degrees of freedom for the standard deviation.
    ///
    /// `0` (the default) gives the population standard deviation.
    pub ddof: usize,
}

impl ZTransformConfig {
    /// Create a configuration with the population standard deviation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delta degrees of freedom.
    pub fn with_ddof(mut self, ddof: usize) -> Self {
        self.ddof = ddof;
        self
    }
}

/// Z Transform.
///
/// Standardizes values using the formula: z = (x - μ) / σ
///
/// # Edge Cases
///
/// - σ = 0: not guarded; transform yields ±inf (or NaN where x = μ)
/// - NaN in the fitting sample: skipped when computing μ and σ
/// - NaN in transform input: propagates
#[derive(Debug, Clone)]
pub struct ZTransform<T: Real> {
    mean: ArrayD<T>,
    std: ArrayD<T>,
}

impl<T: Real> ZTransform<T> {
    /// Fit on a sample using the population standard deviation.
    ///
    /// Axis 0 of `sample` is the sample axis; parameters get the remaining
    /// shape (a scalar for a 1-D sample).
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

    /// Fit on a sample with an explicit configuration.
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
        let view = sample.view().into_dyn();
        Self::fit_view(view, config)
    }

    pub(crate) fn fit_view(
        sample: ArrayViewD<'_, T>,
        config: ZTransformConfig,
    ) -> TransformResult<Self> {
        let mean = nan_mean(sample.view())?;
        let std = nan_std(sample.view(), config.ddof)?;

        let zero_scale = std.iter().filter(|&&s| s == T::ZERO).count();
        if zero_scale > 0 {
            tracing::warn!(
                zero_scale,
                lanes = std.len(),
                "z-transform fitted with zero standard deviation; transform will divide by zero"
            );
        }

        tracing::debug!(
            rows = sample.shape()[0],
            param_shape = ?mean.shape(),
            ddof = config.ddof,
            "fitted z-transform"
        );

        Ok(Self { mean, std })
    }

    /// Fitted mean, one entry per lane.
    pub fn mean(&self) -> ArrayViewD<'_, T> {
        self.mean.view()
    }

    /// Fitted standard deviation, one entry per lane.
    pub fn std(&self) -> ArrayViewD<'_, T> {
        self.std.view()
    }
}

impl<T: Real> Transform<T> for ZTransform<T> {
    fn transform(&self, x: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        tracing::trace!(shape = ?x.shape(), "z-transform forward");
        zip_with2(x, &self.mean, &self.std, |x, mean, std| (x - mean) / std)
    }
}

impl<T: Real> InvertibleTransform<T> for ZTransform<T> {
    fn untransform(&self, z: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
        tracing::trace!(shape = ?z.shape(), "z-transform inverse");
        // Inverse: x = z * σ + μ
        zip_with2(z, &self.mean, &self.std, |z, mean, std| z * std + mean)
    }
}
