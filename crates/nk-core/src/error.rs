//! Error types for transform and design-matrix operations.
//!
//! Arithmetic edge cases (division by zero, logarithms of non-positive values)
//! are not errors: they propagate as IEEE-754 infinities and NaN. The types here
//! cover structural failures only, with error chaining via `thiserror`.

use thiserror::Error;

/// Result type alias for transform operations that may fail.
pub type TransformResult<T> = core::result::Result<T, TransformError>;

/// Result type alias for formula parsing and evaluation.
pub type FormulaResult<T> = core::result::Result<T, FormulaError>;

/// Errors that can occur while fitting or applying a transform.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The fitting sample has no axis 0 to reduce along.
    #[error("Cannot fit on a {0}-dimensional array: a sample axis (axis 0) is required")]
    MissingSampleAxis(usize),

    /// Fitted parameters cannot be broadcast to the input shape.
    #[error("Shape mismatch: parameters of shape {params:?} cannot broadcast to input of shape {input:?}")]
    Broadcast {
        /// Shape of the fitted parameters.
        params: Vec<usize>,
        /// Shape of the input array.
        input: Vec<usize>,
    },

    /// Input array has an unsupported dimensionality.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// Design-matrix formula evaluation failed.
    #[error("Design matrix evaluation failed")]
    Formula(#[from] FormulaError),
}

/// Errors raised by the formula mini-language and its spline basis.
#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    /// The formula text could not be parsed.
    #[error("Formula parse error at offset {position}: {message}")]
    Parse {
        /// Byte offset into the formula string.
        position: usize,
        /// What the parser expected or found.
        message: String,
    },

    /// The formula calls a basis function that is not registered.
    #[error("Unknown function '{0}' in formula")]
    UnknownFunction(String),

    /// A name in the formula is not bound to any value.
    #[error("Name '{0}' is not bound to a value")]
    UnknownVariable(String),

    /// A keyword argument the function does not accept.
    #[error("{function}() got an unexpected argument '{argument}'")]
    UnexpectedArgument {
        /// Function name.
        function: String,
        /// Offending argument name.
        argument: String,
    },

    /// The same argument was supplied more than once.
    #[error("{function}() got multiple values for argument '{argument}'")]
    DuplicateArgument {
        /// Function name.
        function: String,
        /// Repeated argument name.
        argument: String,
    },

    /// A required argument is missing.
    #[error("{function}() missing required argument '{argument}'")]
    MissingArgument {
        /// Function name.
        function: String,
        /// Missing argument name.
        argument: String,
    },

    /// An argument value has the wrong kind or range.
    #[error("{function}() argument '{argument}' must be {expected}")]
    InvalidArgument {
        /// Function name.
        function: String,
        /// Argument name.
        argument: String,
        /// Description of the accepted values.
        expected: &'static str,
    },

    /// Data variables in one formula have different lengths.
    #[error("Variable length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch {
        /// Row count established by an earlier term.
        expected: usize,
        /// Row count of the offending term.
        actual: usize,
    },

    /// The formula references no data, so the row count is unknown.
    #[error("Cannot determine the number of rows: formula has no data terms")]
    NoRows,

    /// A data variable contains NaN.
    #[error("Variable '{0}' contains missing values")]
    MissingValues(String),

    /// A data variable is empty where a range is required.
    #[error("Variable '{0}' is empty; cannot infer boundary knots")]
    EmptyVariable(String),

    /// Neither `df` nor `knots` was given.
    #[error("{0}() requires either 'df' or 'knots'")]
    MissingKnotSpec(String),

    /// `df` is smaller than the spline order allows.
    #[error("df={df} is too small for degree={degree} and include_intercept={include_intercept}; must be >= {min}")]
    DfTooSmall {
        /// Requested degrees of freedom.
        df: usize,
        /// Spline degree.
        degree: usize,
        /// Whether the intercept basis is kept.
        include_intercept: bool,
        /// Smallest accepted df.
        min: usize,
    },

    /// `df` and explicit `knots` disagree.
    #[error("df={df} with degree={degree} implies {implied} knots, but {provided} knots were provided")]
    KnotCountMismatch {
        /// Requested degrees of freedom.
        df: usize,
        /// Spline degree.
        degree: usize,
        /// Interior knot count implied by df.
        implied: usize,
        /// Interior knot count supplied.
        provided: usize,
    },

    /// Lower boundary knot exceeds the upper one.
    #[error("lower_bound ({lower}) is greater than upper_bound ({upper})")]
    InvalidBounds {
        /// Lower boundary knot.
        lower: f64,
        /// Upper boundary knot.
        upper: f64,
    },

    /// An interior knot lies below the lower boundary.
    #[error("Knot value {knot} falls below lower bound {bound}")]
    KnotBelowLowerBound {
        /// Offending knot.
        knot: f64,
        /// Lower boundary knot.
        bound: f64,
    },

    /// An interior knot lies above the upper boundary.
    #[error("Knot value {knot} falls above upper bound {bound}")]
    KnotAboveUpperBound {
        /// Offending knot.
        knot: f64,
        /// Upper boundary knot.
        bound: f64,
    },

    /// Data lies outside the boundary knots.
    #[error("Data value {value} falls outside the outermost knots [{lower}, {upper}]")]
    DataOutsideKnots {
        /// First offending data value.
        value: f64,
        /// Lower boundary knot.
        lower: f64,
        /// Upper boundary knot.
        upper: f64,
    },
}

impl FormulaError {
    /// Create a parse error at a byte offset.
    #[must_use]
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}
