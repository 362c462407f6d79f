//! Core trait definitions for transforms.
//!
//! Every transform is fitted once, at construction, and is immutable afterwards.
//! The forward direction lives in [`Transform`]; transforms that can be undone
//! additionally implement [`InvertibleTransform`]. Keeping the inverse in its
//! own trait lets one-way transforms (design-matrix builders) satisfy the
//! contract without a stub that always fails.

use ndarray::{arr0, ArrayD, ArrayViewD};

use crate::error::TransformResult;
use crate::num::Real;

/// Forward mapping from raw-scale values to transformed values.
///
/// Arrays are passed with dynamic dimensionality so that scalars (0-d),
/// single columns (1-d) and `[n, d]` samples share one object-safe interface.
///
/// # Example
///
/// ```rust,ignore
/// use nk_core::Transform;
///
/// let z = ZTransform::fit(&train)?;
/// let scaled = z.transform(test.view().into_dyn())?;
/// ```
pub trait Transform<T: Real>: Send + Sync {
    /// Apply the transformation to input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the fitted parameters cannot be applied to the
    /// input's shape, or if the underlying evaluation fails.
    fn transform(&self, x: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>>;
}

/// A transform with an exact inverse.
///
/// Implementations uphold the round-trip law: for every `x` in the domain,
/// `untransform(transform(x)) == x` up to floating-point precision.
pub trait InvertibleTransform<T: Real>: Transform<T> {
    /// Map transformed values back to the raw scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the fitted parameters cannot be applied to the
    /// input's shape.
    fn untransform(&self, y: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>>;

    /// Transform a single value.
    ///
    /// Only meaningful for transforms fitted on a 1-D sample, whose
    /// parameters are scalars.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are not scalar.
    fn transform_value(&self, x: T) -> TransformResult<T> {
        let out = self.transform(arr0(x).into_dyn().view())?;
        Ok(out.first().copied().unwrap_or(T::NAN))
    }

    /// Untransform a single value.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are not scalar.
    fn untransform_value(&self, y: T) -> TransformResult<T> {
        let out = self.untransform(arr0(y).into_dyn().view())?;
        Ok(out.first().copied().unwrap_or(T::NAN))
    }
}
