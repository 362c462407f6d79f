//! NaN-skipping reductions along the sample axis.
//!
//! These mirror the missing-value semantics of `nanmean`, `nanstd` and
//! `nanmax`: NaN entries are ignored, and a lane with no valid entries reduces
//! to NaN. Infinities are ordinary values and are not skipped.

use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis};

use crate::error::{TransformError, TransformResult};
use crate::num::Real;

/// Mean of a lane, ignoring NaN values.
fn lane_mean<T: Real>(lane: ArrayView1<'_, T>) -> T {
    let mut sum = T::ZERO;
    let mut count = 0usize;

    for &val in lane.iter() {
        if !val.is_nan() {
            sum = sum + val;
            count += 1;
        }
    }

    if count == 0 {
        T::NAN
    } else {
        sum / <T as Real>::from_usize(count)
    }
}

/// Standard deviation of a lane with `ddof` delta degrees of freedom.
fn lane_std<T: Real>(lane: ArrayView1<'_, T>, ddof: usize) -> T {
    let mean = lane_mean(lane);
    if mean.is_nan() {
        return T::NAN;
    }

    let mut sum_sq = T::ZERO;
    let mut count = 0usize;

    for &val in lane.iter() {
        if !val.is_nan() {
            let diff = val - mean;
            sum_sq = sum_sq + diff * diff;
            count += 1;
        }
    }

    if count <= ddof {
        T::NAN
    } else {
        (sum_sq / <T as Real>::from_usize(count - ddof)).sqrt()
    }
}

/// Maximum of a lane, ignoring NaN values.
fn lane_max<T: Real>(lane: ArrayView1<'_, T>) -> T {
    lane.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<T>, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
        .unwrap_or(T::NAN)
}

fn require_sample_axis<T: Real>(sample: &ArrayViewD<'_, T>) -> TransformResult<()> {
    if sample.ndim() == 0 {
        return Err(TransformError::MissingSampleAxis(0));
    }
    Ok(())
}

/// Mean along axis 0, ignoring NaN.
///
/// The result has the sample's shape with axis 0 removed.
///
/// # Errors
///
/// Returns [`TransformError::MissingSampleAxis`] for a 0-d input.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use nk_core::stats::nan_mean;
///
/// let x = array![[1.0, 10.0], [f64::NAN, 20.0], [3.0, 30.0]];
/// let mean = nan_mean(x.view().into_dyn()).unwrap();
/// assert_eq!(mean.as_slice().unwrap(), &[2.0, 20.0]);
/// ```
pub fn nan_mean<T: Real>(sample: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
    require_sample_axis(&sample)?;
    Ok(sample.map_axis(Axis(0), lane_mean))
}

/// Standard deviation along axis 0, ignoring NaN.
///
/// `ddof = 0` gives the population standard deviation. A lane whose valid
/// count does not exceed `ddof` reduces to NaN.
///
/// # Errors
///
/// Returns [`TransformError::MissingSampleAxis`] for a 0-d input.
pub fn nan_std<T: Real>(sample: ArrayViewD<'_, T>, ddof: usize) -> TransformResult<ArrayD<T>> {
    require_sample_axis(&sample)?;
    Ok(sample.map_axis(Axis(0), |lane| lane_std(lane, ddof)))
}

/// Maximum along axis 0, ignoring NaN.
///
/// # Errors
///
/// Returns [`TransformError::MissingSampleAxis`] for a 0-d input.
pub fn nan_max<T: Real>(sample: ArrayViewD<'_, T>) -> TransformResult<ArrayD<T>> {
    require_sample_axis(&sample)?;
    Ok(sample.map_axis(Axis(0), lane_max))
}

/// Linear-interpolated percentile of already sorted, NaN-free data.
///
/// `q` is in `[0, 100]`. Returns NaN for empty input.
#[must_use]
pub fn percentile_sorted<T: Real>(sorted: &[T], q: T) -> T {
    match sorted.len() {
        0 => T::NAN,
        1 => sorted[0],
        n => {
            let rank = q / T::HUNDRED * <T as Real>::from_usize(n - 1);
            let lo = rank.floor();
            let lo_idx = lo.to_usize().unwrap_or(0).min(n - 1);
            let hi_idx = (lo_idx + 1).min(n - 1);
            let frac = rank - lo;
            sorted[lo_idx] + (sorted[hi_idx] - sorted[lo_idx]) * frac
        }
    }
}
