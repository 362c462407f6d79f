//! Element-wise application of fitted parameters.
//!
//! Fitted parameters have the sample's shape with axis 0 removed. They are
//! broadcast against the input with NumPy's trailing-axis rules, so a `[d]`
//! parameter applies to `[d]`, `[n, d]` and `[m, n, d]` inputs alike.

use ndarray::{ArrayD, ArrayViewD, Zip};

use crate::error::{TransformError, TransformResult};
use crate::num::Real;

/// Broadcast a parameter array to the shape of `input`.
///
/// # Errors
///
/// Returns [`TransformError::Broadcast`] if the shapes are incompatible.
pub fn broadcast_param<'a, T: Real>(
    param: &'a ArrayD<T>,
    input: &ArrayViewD<'_, T>,
) -> TransformResult<ArrayViewD<'a, T>> {
    param
        .broadcast(input.raw_dim())
        .ok_or_else(|| TransformError::Broadcast {
            params: param.shape().to_vec(),
            input: input.shape().to_vec(),
        })
}

/// Apply `f(x, a)` element-wise with one broadcast parameter.
///
/// # Errors
///
/// Returns [`TransformError::Broadcast`] if `a` does not broadcast to `x`.
pub fn zip_with<T, F>(x: ArrayViewD<'_, T>, a: &ArrayD<T>, f: F) -> TransformResult<ArrayD<T>>
where
    T: Real,
    F: Fn(T, T) -> T,
{
    let a = broadcast_param(a, &x)?;
    Ok(Zip::from(&x).and(&a).map_collect(|&x, &a| f(x, a)))
}

/// Apply `f(x, a, b)` element-wise with two broadcast parameters.
///
/// # Errors
///
/// Returns [`TransformError::Broadcast`] if `a` or `b` does not broadcast to `x`.
pub fn zip_with2<T, F>(
    x: ArrayViewD<'_, T>,
    a: &ArrayD<T>,
    b: &ArrayD<T>,
    f: F,
) -> TransformResult<ArrayD<T>>
where
    T: Real,
    F: Fn(T, T, T) -> T,
{
    let a = broadcast_param(a, &x)?;
    let b = broadcast_param(b, &x)?;
    Ok(Zip::from(&x)
        .and(&a)
        .and(&b)
        .map_collect(|&x, &a, &b| f(x, a, b)))
}
