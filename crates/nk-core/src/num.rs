//! Numeric type abstractions for transform computations.
//!
//! This module defines the [`Real`] trait which abstracts over `f32` and `f64`
//! so that transforms and spline bases can be written once.

use core::cmp::Ordering;
use core::fmt::{Debug, Display};
use num_traits::{Float, FromPrimitive, ToPrimitive};

/// Trait for floating-point element types stored in transform arrays.
///
/// # Associated Constants
///
/// - `NAN` - Not-a-number value, the missing-value marker
/// - `ZERO` - Zero value
/// - `ONE` - One value
/// - `HUNDRED` - Hundred value (percentile ranks)
///
/// # Example
///
/// ```rust
/// use nk_core::Real;
///
/// fn standardize<T: Real>(x: T, mean: T, std: T) -> T {
///     (x - mean) / std
/// }
///
/// assert_eq!(standardize(5.0_f64, 3.0, 2.0), 1.0);
/// ```
pub trait Real:
    Float + FromPrimitive + ToPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
    /// Not-a-number value.
    const NAN: Self;
    /// Zero value.
    const ZERO: Self;
    /// One value.
    const ONE: Self;
    /// Hundred value.
    const HUNDRED: Self;

    /// Convert from `f64`.
    #[must_use]
    fn from_f64_lossy(value: f64) -> Self;

    /// Convert to `f64`.
    #[must_use]
    fn to_f64_lossy(self) -> f64;

    /// Convert from `usize`.
    #[must_use]
    fn from_usize(value: usize) -> Self;

    /// Total comparison that handles NaN consistently.
    ///
    /// NaN values are ordered after all other values (including +infinity).
    #[must_use]
    fn total_cmp_fn(&self, other: &Self) -> Ordering;
}

impl Real for f32 {
    const NAN: Self = f32::NAN;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HUNDRED: Self = 100.0;

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64_lossy(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_usize(value: usize) -> Self {
        value as f32
    }

    #[inline]
    fn total_cmp_fn(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Real for f64 {
    const NAN: Self = f64::NAN;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HUNDRED: Self = 100.0;

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self
    }

    #[inline]
    fn from_usize(value: usize) -> Self {
        value as f64
    }

    #[inline]
    fn total_cmp_fn(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_f64() {
        assert!(<f64 as Real>::NAN.is_nan());
        assert_eq!(<f64 as Real>::ZERO, 0.0);
        assert_eq!(<f64 as Real>::ONE, 1.0);
        assert_eq!(<f64 as Real>::HUNDRED, 100.0);
    }

    #[test]
    fn test_constants_f32() {
        assert!(<f32 as Real>::NAN.is_nan());
        assert_eq!(<f32 as Real>::ZERO, 0.0);
        assert_eq!(<f32 as Real>::ONE, 1.0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(f64::from_f64_lossy(42.5), 42.5);
        assert_eq!(f32::from_f64_lossy(42.5), 42.5f32);
        assert_eq!(42.5f32.to_f64_lossy(), 42.5);
        assert_eq!(<f64 as Real>::from_usize(7), 7.0);
    }

    #[test]
    fn test_total_cmp_nan_ordering() {
        let mut values = vec![1.0f64, f64::NAN, -2.0, 0.5];
        values.sort_by(|a, b| a.total_cmp_fn(b));

        assert_eq!(values[0], -2.0);
        assert_eq!(values[1], 0.5);
        assert_eq!(values[2], 1.0);
        assert!(values[3].is_nan());
    }
}
