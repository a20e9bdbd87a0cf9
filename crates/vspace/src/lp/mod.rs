//! Linear programs behind a narrow solver interface.
//!
//! Problem shape (fixed dimension `n`)
//! - minimize `c·x`
//! - subject to `lower <= x <= upper` (bounds may be infinite) and any number
//!   of rows `a·x <= b`.
//!
//! The version space only needs this interface; `SimplexSolver` is the
//! native backend. Another backend plugs in by implementing
//! `LinearProgramSolver` and handing it to `LinearVersionSpace::with_solver`.

mod simplex;

pub use simplex::{SimplexCfg, SimplexSolver};

use nalgebra::DVector;

/// Errors surfaced while configuring or solving a linear program.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LpError {
    #[error("solver dimension must be > 0")]
    ZeroDimension,
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("optimization failed: inconsistent bounds {lower} > {upper} at {index}")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },
    #[error("optimization failed: problem is infeasible")]
    Infeasible,
    #[error("optimization failed: problem is unbounded")]
    Unbounded,
    #[error("optimization failed: no optimum after {iterations} pivots")]
    IterationLimit { iterations: usize },
    #[error("optimization failed: singular basis")]
    SingularBasis,
}

/// Minimizer of a linear objective over a box and linear inequalities.
///
/// Setters replace the previous value; constraints only accumulate.
pub trait LinearProgramSolver {
    fn dim(&self) -> usize;

    fn set_objective_function(&mut self, c: DVector<f64>) -> Result<(), LpError>;

    /// Lower bounds (`-∞` allowed). Default: all `-∞`.
    fn set_lower(&mut self, lower: DVector<f64>) -> Result<(), LpError>;

    /// Upper bounds (`+∞` allowed). Default: all `+∞`.
    fn set_upper(&mut self, upper: DVector<f64>) -> Result<(), LpError>;

    /// Append `a·x <= b`.
    fn add_linear_constraint(&mut self, a: DVector<f64>, b: f64) -> Result<(), LpError>;

    fn num_constraints(&self) -> usize;

    /// Optimal point, or `Infeasible` / `Unbounded` / `IterationLimit`.
    fn find_minimizer(&self) -> Result<DVector<f64>, LpError>;
}

#[inline]
pub(crate) fn check_len(expected: usize, actual: usize) -> Result<(), LpError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LpError::DimensionMismatch { expected, actual })
    }
}
