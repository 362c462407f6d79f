//! B-spline basis (`bs`).
//!
//! Basis functions are evaluated with the Cox-de Boor recursion in the
//! triangular form of Piegl & Tiller (Algorithm A2.2), which only touches the
//! `degree + 1` functions that are nonzero on the knot span containing `x`.

use ndarray::{s, Array1, Array2, ArrayView1};

use nk_core::{
    error::{FormulaError, FormulaResult},
    num::Real,
    stats::percentile_sorted,
};

use crate::evaluator::ArgValue;

/// Parameter names of `bs` in positional order.
const BS_PARAMS: [&str; 7] = [
    "x",
    "df",
    "knots",
    "degree",
    "include_intercept",
    "lower_bound",
    "upper_bound",
];

/// Options accepted by the `bs` basis, other than the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BsSpec<T: Real> {
    /// Degrees of freedom; picks interior knots from quantiles of `x`.
    pub df: Option<usize>,
    /// Interior knots.
    pub knots: Option<Array1<T>>,
    /// Polynomial degree.
    pub degree: usize,
    /// Keep the first basis function.
    pub include_intercept: bool,
    /// Lower boundary knot; defaults to `min(x)`.
    pub lower_bound: Option<T>,
    /// Upper boundary knot; defaults to `max(x)`.
    pub upper_bound: Option<T>,
}

impl<T: Real> Default for BsSpec<T> {
    fn default() -> Self {
        Self {
            df: None,
            knots: None,
            degree: 3,
            include_intercept: false,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

const TOO_LARGE: &str = "small enough for the knot vector to fit in memory";

fn invalid(function: &str, argument: &str, expected: &'static str) -> FormulaError {
    FormulaError::InvalidArgument {
        function: function.to_string(),
        argument: argument.to_string(),
        expected,
    }
}

fn as_count<T: Real>(function: &str, argument: &str, value: ArgValue<T>) -> FormulaResult<usize> {
    match value {
        ArgValue::Scalar(v) if v >= T::ZERO && v.fract() == T::ZERO => v
            .to_usize()
            .ok_or_else(|| invalid(function, argument, "a non-negative integer")),
        _ => Err(invalid(function, argument, "a non-negative integer")),
    }
}

fn as_optional_scalar<T: Real>(
    function: &str,
    argument: &str,
    value: ArgValue<T>,
) -> FormulaResult<Option<T>> {
    match value {
        ArgValue::None => Ok(None),
        ArgValue::Scalar(v) if !v.is_nan() => Ok(Some(v)),
        _ => Err(invalid(function, argument, "a number or None")),
    }
}

/// Bind resolved call arguments to the `bs` signature.
///
/// Returns the name of the data variable, its values, and the options.
pub(crate) fn bind_bs_args<T: Real>(
    function: &str,
    args: Vec<(Option<String>, ArgValue<T>)>,
) -> FormulaResult<(String, Array1<T>, BsSpec<T>)> {
    let mut slots: [Option<ArgValue<T>>; 7] = Default::default();

    for (index, (name, value)) in args.into_iter().enumerate() {
        let slot = match name {
            Some(name) => match BS_PARAMS.iter().position(|p| *p == name) {
                Some(slot) => slot,
                None => {
                    return Err(FormulaError::UnexpectedArgument {
                        function: function.to_string(),
                        argument: name,
                    })
                }
            },
            None if index < BS_PARAMS.len() => index,
            None => {
                return Err(FormulaError::UnexpectedArgument {
                    function: function.to_string(),
                    argument: format!("positional #{}", index + 1),
                })
            }
        };

        if slots[slot].is_some() {
            return Err(FormulaError::DuplicateArgument {
                function: function.to_string(),
                argument: BS_PARAMS[slot].to_string(),
            });
        }
        slots[slot] = Some(value);
    }

    let [x, df, knots, degree, include_intercept, lower_bound, upper_bound] = slots;

    let (variable, x) = match x {
        Some(ArgValue::Vector { name, values }) => (name, values),
        Some(_) => return Err(invalid(function, "x", "a data vector")),
        None => {
            return Err(FormulaError::MissingArgument {
                function: function.to_string(),
                argument: "x".to_string(),
            })
        }
    };

    let defaults = BsSpec::<T>::default();
    let df = match df {
        None | Some(ArgValue::None) => None,
        Some(value) => Some(as_count(function, "df", value)?),
    };
    let knots = match knots {
        None | Some(ArgValue::None) => None,
        Some(ArgValue::Vector { values, .. }) => Some(values),
        Some(ArgValue::Scalar(v)) => Some(Array1::from_elem(1, v)),
        Some(ArgValue::Bool(_)) => return Err(invalid(function, "knots", "a vector of knots")),
    };
    let degree = match degree {
        None => defaults.degree,
        Some(value) => as_count(function, "degree", value)?,
    };
    let include_intercept = match include_intercept {
        None => defaults.include_intercept,
        Some(ArgValue::Bool(flag)) => flag,
        Some(ArgValue::Scalar(v)) => v != T::ZERO,
        Some(_) => return Err(invalid(function, "include_intercept", "True or False")),
    };
    let lower_bound = match lower_bound {
        None => None,
        Some(value) => as_optional_scalar(function, "lower_bound", value)?,
    };
    let upper_bound = match upper_bound {
        None => None,
        Some(value) => as_optional_scalar(function, "upper_bound", value)?,
    };

    let spec = BsSpec {
        df,
        knots,
        degree,
        include_intercept,
        lower_bound,
        upper_bound,
    };
    Ok((variable, x, spec))
}

/// A B-spline basis with a fixed knot vector.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineBasis<T: Real> {
    knots: Array1<T>,
    degree: usize,
    include_intercept: bool,
    lower: T,
    upper: T,
}

impl<T: Real> BSplineBasis<T> {
    /// Build the knot vector for data `x` named `variable`.
    ///
    /// Interior knots come from `spec.knots`, or from evenly spaced
    /// percentiles of `x` when only `spec.df` is given. Boundary knots default
    /// to the range of `x`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormulaError`] if the knot specification is missing or
    /// inconsistent, or the boundaries are invalid.
    pub fn new(variable: &str, x: ArrayView1<'_, T>, spec: &BsSpec<T>) -> FormulaResult<Self> {
        let degree = spec.degree;
        let order = degree
            .checked_add(1)
            .ok_or_else(|| invalid("bs", "degree", TOO_LARGE))?;

        let implied = match spec.df {
            Some(df) => {
                let offset = usize::from(!spec.include_intercept);
                if df.saturating_add(offset) < order {
                    return Err(FormulaError::DfTooSmall {
                        df,
                        degree,
                        include_intercept: spec.include_intercept,
                        min: order - offset,
                    });
                }
                Some(df.saturating_add(offset) - order)
            }
            None => None,
        };

        let inner: Vec<T> = match (implied, &spec.knots) {
            (None, None) => return Err(FormulaError::MissingKnotSpec("bs".to_string())),
            (Some(n_inner), Some(knots)) if knots.len() != n_inner => {
                return Err(FormulaError::KnotCountMismatch {
                    df: spec.df.unwrap_or_default(),
                    degree,
                    implied: n_inner,
                    provided: knots.len(),
                })
            }
            (_, Some(knots)) => knots.to_vec(),
            (Some(n_inner), None) => quantile_knots(variable, x, n_inner)?,
        };

        let lower = match spec.lower_bound {
            Some(bound) => bound,
            None => range(variable, x)?.0,
        };
        let upper = match spec.upper_bound {
            Some(bound) => bound,
            None => range(variable, x)?.1,
        };
        if lower > upper {
            return Err(FormulaError::InvalidBounds {
                lower: lower.to_f64_lossy(),
                upper: upper.to_f64_lossy(),
            });
        }

        for &knot in &inner {
            if !knot.is_finite() {
                return Err(invalid("bs", "knots", "finite values"));
            }
            if knot < lower {
                return Err(FormulaError::KnotBelowLowerBound {
                    knot: knot.to_f64_lossy(),
                    bound: lower.to_f64_lossy(),
                });
            }
            if knot > upper {
                return Err(FormulaError::KnotAboveUpperBound {
                    knot: knot.to_f64_lossy(),
                    bound: upper.to_f64_lossy(),
                });
            }
        }

        let len = order
            .checked_mul(2)
            .and_then(|n| n.checked_add(inner.len()))
            .ok_or_else(|| invalid("bs", "degree", TOO_LARGE))?;
        let mut all = Vec::new();
        all.try_reserve_exact(len)
            .map_err(|_| invalid("bs", "degree", TOO_LARGE))?;
        all.extend(std::iter::repeat(lower).take(order));
        all.extend(std::iter::repeat(upper).take(order));
        all.extend(inner);
        all.sort_by(T::total_cmp_fn);

        tracing::debug!(
            variable,
            degree,
            knots = all.len(),
            include_intercept = spec.include_intercept,
            "built b-spline basis"
        );

        Ok(Self {
            knots: Array1::from(all),
            degree,
            include_intercept: spec.include_intercept,
            lower,
            upper,
        })
    }

    /// Full knot vector, boundary knots repeated `degree + 1` times.
    pub fn knots(&self) -> ArrayView1<'_, T> {
        self.knots.view()
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of output columns.
    pub fn num_columns(&self) -> usize {
        self.num_basis() - usize::from(!self.include_intercept)
    }

    fn num_basis(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    /// Evaluate every basis function at every point of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::DataOutsideKnots`] if any value lies outside
    /// the boundary knots.
    pub fn evaluate(&self, x: ArrayView1<'_, T>) -> FormulaResult<Array2<T>> {
        if let Some(&value) = x.iter().find(|&&v| v < self.lower || v > self.upper) {
            return Err(FormulaError::DataOutsideKnots {
                value: value.to_f64_lossy(),
                lower: self.lower.to_f64_lossy(),
                upper: self.upper.to_f64_lossy(),
            });
        }

        let num_basis = self.num_basis();
        let mut out = Array2::zeros((x.len(), num_basis));
        let mut scratch = Scratch::new(self.degree);
        let mut row = vec![T::ZERO; num_basis];

        for (i, &value) in x.iter().enumerate() {
            evaluate_at_point(value, self.degree, self.knots.view(), &mut row, &mut scratch);
            out.row_mut(i).assign(&ArrayView1::from(&row[..]));
        }

        if self.include_intercept {
            Ok(out)
        } else {
            Ok(out.slice(s![.., 1..]).to_owned())
        }
    }
}

fn range<T: Real>(variable: &str, x: ArrayView1<'_, T>) -> FormulaResult<(T, T)> {
    x.iter()
        .fold(None, |acc: Option<(T, T)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or_else(|| FormulaError::EmptyVariable(variable.to_string()))
}

/// Interior knots at `linspace(0, 100, n_inner + 2)[1..-1]` percentiles of `x`.
fn quantile_knots<T: Real>(
    variable: &str,
    x: ArrayView1<'_, T>,
    n_inner: usize,
) -> FormulaResult<Vec<T>> {
    if n_inner == 0 {
        return Ok(Vec::new());
    }
    if x.is_empty() {
        return Err(FormulaError::EmptyVariable(variable.to_string()));
    }

    let mut sorted = x.to_vec();
    sorted.sort_by(T::total_cmp_fn);

    let mut knots = Vec::new();
    knots
        .try_reserve_exact(n_inner)
        .map_err(|_| invalid("bs", "df", TOO_LARGE))?;

    let step = T::HUNDRED / <T as Real>::from_usize(n_inner + 1);
    knots.extend(
        (1..=n_inner).map(|i| percentile_sorted(&sorted, step * <T as Real>::from_usize(i))),
    );
    Ok(knots)
}

struct Scratch<T> {
    left: Vec<T>,
    right: Vec<T>,
    n: Vec<T>,
}

impl<T: Real> Scratch<T> {
    fn new(degree: usize) -> Self {
        Self {
            left: vec![T::ZERO; degree + 1],
            right: vec![T::ZERO; degree + 1],
            n: vec![T::ZERO; degree + 1],
        }
    }
}

/// Index `mu` of the knot span with `knots[mu] <= x < knots[mu + 1]`.
///
/// At the right boundary the last non-empty span is used so the basis stays
/// a partition of unity there.
fn find_span<T: Real>(x: T, degree: usize, knots: ArrayView1<'_, T>) -> usize {
    let num_basis = knots.len() - degree - 1;

    let mut span = if x >= knots[num_basis] {
        num_basis - 1
    } else {
        let mut span = degree;
        while span + 1 < num_basis && x >= knots[span + 1] {
            span += 1;
        }
        span
    };

    while span > degree && knots[span] >= knots[span + 1] {
        span -= 1;
    }
    span
}

/// Write all basis values at `x` into `out`, zero outside the active span.
fn evaluate_at_point<T: Real>(
    x: T,
    degree: usize,
    knots: ArrayView1<'_, T>,
    out: &mut [T],
    scratch: &mut Scratch<T>,
) {
    let mu = find_span(x, degree, knots);
    let Scratch { left, right, n } = scratch;

    n.fill(T::ZERO);
    n[0] = T::ONE;
    for d in 1..=degree {
        left[d] = x - knots[mu + 1 - d];
        right[d] = knots[mu + d] - x;

        let mut saved = T::ZERO;
        for r in 0..d {
            let denom = right[r + 1] + left[d - r];
            let temp = if denom > T::ZERO { n[r] / denom } else { T::ZERO };
            n[r] = saved + right[r + 1] * temp;
            saved = left[d - r] * temp;
        }
        n[d] = saved;
    }

    out.fill(T::ZERO);
    let start = mu - degree;
    for (slot, &value) in out.iter_mut().skip(start).zip(n.iter()) {
        *slot = value;
    }
}
