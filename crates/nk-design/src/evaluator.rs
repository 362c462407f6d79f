//! Formula evaluation into design matrices.

use indexmap::IndexMap;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use nk_core::{
    error::{FormulaError, FormulaResult},
    num::Real,
};

use crate::bspline::{bind_bs_args, BSplineBasis};
use crate::formula::{Call, Expr, Formula, Term};

/// Name of the intercept column.
pub const INTERCEPT_COLUMN: &str = "Intercept";

/// A value bound to a formula name.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<T: Real> {
    /// One value per row.
    Vector(Array1<T>),
    /// A single number.
    Scalar(T),
}

/// Ordered name bindings visible to a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings<T: Real> {
    vars: IndexMap<String, Binding<T>>,
}

impl<T: Real> Default for Bindings<T> {
    fn default() -> Self {
        Self {
            vars: IndexMap::new(),
        }
    }
}

impl<T: Real> Bindings<T> {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a data vector, replacing any previous value for `name`.
    pub fn insert_vector(&mut self, name: impl Into<String>, values: Array1<T>) {
        self.vars.insert(name.into(), Binding::Vector(values));
    }

    /// Bind a scalar, replacing any previous value for `name`.
    pub fn insert_scalar(&mut self, name: impl Into<String>, value: T) {
        self.vars.insert(name.into(), Binding::Scalar(value));
    }

    /// Builder form of [`insert_vector`](Self::insert_vector).
    #[must_use]
    pub fn with_vector(mut self, name: impl Into<String>, values: Array1<T>) -> Self {
        self.insert_vector(name, values);
        self
    }

    /// Builder form of [`insert_scalar`](Self::insert_scalar).
    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert_scalar(name, value);
        self
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Binding<T>> {
        self.vars.get(name)
    }

    /// Bound names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no names are bound.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// A design matrix with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix<T: Real> {
    matrix: Array2<T>,
    column_names: Vec<String>,
}

impl<T: Real> DesignMatrix<T> {
    /// The matrix, rows by columns.
    pub fn matrix(&self) -> ArrayView2<'_, T> {
        self.matrix.view()
    }

    /// Column names in column order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Take the matrix, dropping the column names.
    pub fn into_matrix(self) -> Array2<T> {
        self.matrix
    }
}

/// Evaluates a formula against bound data.
///
/// This is the seam for swapping in another formula engine.
pub trait DesignEvaluator<T: Real>: Send + Sync {
    /// Build the design matrix for `formula`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormulaError`] if the formula is malformed or its
    /// functions reject their arguments.
    fn evaluate(&self, formula: &str, bindings: &Bindings<T>) -> FormulaResult<DesignMatrix<T>>;
}

/// Built-in evaluator supporting data variables and the `bs` spline basis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplineFormulaEvaluator;

/// A resolved call argument.
#[derive(Debug, Clone)]
pub(crate) enum ArgValue<T: Real> {
    Vector { name: String, values: Array1<T> },
    Scalar(T),
    Bool(bool),
    None,
}

/// Columns contributed by one term.
struct Block<T: Real> {
    names: Vec<String>,
    columns: Array2<T>,
}

fn check_missing<T: Real>(name: &str, values: ArrayView1<'_, T>) -> FormulaResult<()> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(FormulaError::MissingValues(name.to_string()));
    }
    Ok(())
}

fn resolve<T: Real>(expr: &Expr, bindings: &Bindings<T>) -> FormulaResult<ArgValue<T>> {
    match expr {
        Expr::Number(value) => Ok(ArgValue::Scalar(T::from_f64_lossy(*value))),
        Expr::Name(name) => match name.as_str() {
            "True" => Ok(ArgValue::Bool(true)),
            "False" => Ok(ArgValue::Bool(false)),
            "None" => Ok(ArgValue::None),
            _ => match bindings.get(name) {
                Some(Binding::Vector(values)) => Ok(ArgValue::Vector {
                    name: name.clone(),
                    values: values.clone(),
                }),
                Some(Binding::Scalar(value)) => Ok(ArgValue::Scalar(*value)),
                None => Err(FormulaError::UnknownVariable(name.clone())),
            },
        },
    }
}

impl SplineFormulaEvaluator {
    fn variable<T: Real>(&self, name: &str, bindings: &Bindings<T>) -> FormulaResult<Block<T>> {
        let values = match bindings.get(name) {
            Some(Binding::Vector(values)) => values,
            Some(Binding::Scalar(_)) => {
                return Err(FormulaError::InvalidArgument {
                    function: "formula".to_string(),
                    argument: name.to_string(),
                    expected: "a data vector",
                })
            }
            None => return Err(FormulaError::UnknownVariable(name.to_string())),
        };
        check_missing(name, values.view())?;

        Ok(Block {
            names: vec![name.to_string()],
            columns: values.clone().insert_axis(ndarray::Axis(1)),
        })
    }

    fn call<T: Real>(&self, call: &Call, bindings: &Bindings<T>) -> FormulaResult<Block<T>> {
        let args = call
            .args
            .iter()
            .map(|arg| Ok((arg.name.clone(), resolve(&arg.value, bindings)?)))
            .collect::<FormulaResult<Vec<_>>>()?;

        let columns = match call.function.as_str() {
            "bs" => {
                let (variable, x, spec) = bind_bs_args(&call.function, args)?;
                check_missing(&variable, x.view())?;
                BSplineBasis::new(&variable, x.view(), &spec)?.evaluate(x.view())?
            }
            other => return Err(FormulaError::UnknownFunction(other.to_string())),
        };

        let prefix = call.to_string();
        let names = (0..columns.ncols())
            .map(|i| format!("{prefix}[{i}]"))
            .collect();
        Ok(Block { names, columns })
    }
}

impl<T: Real> DesignEvaluator<T> for SplineFormulaEvaluator {
    fn evaluate(&self, formula: &str, bindings: &Bindings<T>) -> FormulaResult<DesignMatrix<T>> {
        let parsed = Formula::parse(formula)?;

        let mut blocks = Vec::with_capacity(parsed.terms().len());
        let mut rows: Option<usize> = None;
        for term in parsed.terms() {
            let block = match term {
                Term::Variable(name) => self.variable(name, bindings)?,
                Term::Call(call) => self.call(call, bindings)?,
            };

            let actual = block.columns.nrows();
            match rows {
                Some(expected) if expected != actual => {
                    return Err(FormulaError::LengthMismatch { expected, actual })
                }
                _ => rows = Some(actual),
            }
            blocks.push(block);
        }
        let nrows = rows.ok_or(FormulaError::NoRows)?;

        let intercept = usize::from(parsed.has_intercept());
        let ncols = intercept + blocks.iter().map(|b| b.columns.ncols()).sum::<usize>();

        let mut matrix = Array2::zeros((nrows, ncols));
        let mut column_names = Vec::with_capacity(ncols);
        if parsed.has_intercept() {
            matrix.column_mut(0).fill(T::ONE);
            column_names.push(INTERCEPT_COLUMN.to_string());
        }

        let mut offset = intercept;
        for block in blocks {
            let width = block.columns.ncols();
            matrix
                .slice_mut(s![.., offset..offset + width])
                .assign(&block.columns);
            column_names.extend(block.names);
            offset += width;
        }

        tracing::debug!(formula, rows = nrows, cols = ncols, "evaluated design matrix");

        Ok(DesignMatrix {
            matrix,
            column_names,
        })
    }
}
