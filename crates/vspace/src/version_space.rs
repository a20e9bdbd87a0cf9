//! Version space of homogeneous linear classifiers.
//!
//! Model
//! - A classifier over `dim` features is a weight vector `w ∈ R^{dim+1}`;
//!   index 0 multiplies the constant bias feature `1`.
//! - A labelled example `(x, y)` keeps the classifiers with `y·(w·[1, x]) > 0`,
//!   i.e. the cone constraint `(-y·[1, x])·w < 0`.
//! - The version space is that cone cut by the open unit ball, which makes it
//!   bounded so Hit-and-Run can walk it.
//!
//! Interior point (Chebyshev-style LP over `(z, w)`)
//! - minimize `z` s.t. `-z - y_k·([1, x_k]·w) <= 0` for every example and
//!   `w ∈ [-1, 1]^{dim+1}`, `z` free.
//! - An optimum with `z < 0` certifies `y_k·([1, x_k]·w) >= -z > 0` for all k:
//!   `w` is strictly inside the cone. It is rescaled into the ball before use.
//! - `z >= 0` means the cone has empty interior (contradictory labels); that is
//!   reported as `Degenerate` and never papered over.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::cfg::{EQ_EPS, SEED_RADIUS};
use crate::geom::{
    check_dim, ConvexBody, Ellipsoid, GeometryError, IncrementalPolyhedralCone, Line, LineSegment,
};
use crate::lp::{check_len, LinearProgramSolver, LpError, SimplexSolver};
use crate::sampling::HitAndRun;

/// Binary label of a training example.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Label::Positive => 1.0,
            Label::Negative => -1.0,
        }
    }
}

impl From<bool> for Label {
    fn from(positive: bool) -> Self {
        if positive {
            Label::Positive
        } else {
            Label::Negative
        }
    }
}

/// Accepts exactly `1.0` and `-1.0`.
impl TryFrom<f64> for Label {
    type Error = VersionSpaceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(Label::Positive)
        } else if value == -1.0 {
            Ok(Label::Negative)
        } else {
            Err(VersionSpaceError::InvalidLabel { value })
        }
    }
}

/// Errors surfaced by the version space.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VersionSpaceError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Lp(#[from] LpError),
    #[error("invalid label {value}: expected 1 or -1")]
    InvalidLabel { value: f64 },
    /// The accumulated constraints leave no strict interior.
    #[error("version space has empty interior (optimal slack {slack} is not negative)")]
    Degenerate { slack: f64 },
}

/// Linear classifiers consistent with every label seen so far.
///
/// Invariants:
/// - `cone` and `solver` hold the same constraints, in insertion order.
/// - As a `ConvexBody` the dimension is `feature_dim() + 1`.
#[derive(Clone, Debug)]
pub struct LinearVersionSpace<S = SimplexSolver> {
    dim: usize,
    cone: IncrementalPolyhedralCone,
    ball: Ellipsoid,
    solver: S,
    sampler: HitAndRun,
}

impl LinearVersionSpace<SimplexSolver> {
    /// Version space over `dim` features with the native LP backend.
    pub fn new(dim: usize, sampler: HitAndRun) -> Result<Self, VersionSpaceError> {
        let solver = SimplexSolver::new(dim + 2)?;
        Self::with_solver(dim, sampler, solver)
    }
}

impl<S: LinearProgramSolver> LinearVersionSpace<S> {
    /// Version space using `solver`, which must have dimension `dim + 2`
    /// (slack `z` first, then the `dim + 1` weights). Objective and bounds are
    /// overwritten here.
    pub fn with_solver(
        dim: usize,
        sampler: HitAndRun,
        mut solver: S,
    ) -> Result<Self, VersionSpaceError> {
        if dim == 0 {
            return Err(GeometryError::invalid("version space needs at least one feature").into());
        }
        let n = dim + 2;
        if solver.dim() != n {
            return Err(LpError::DimensionMismatch {
                expected: n,
                actual: solver.dim(),
            }
            .into());
        }
        let mut objective = DVector::zeros(n);
        objective[0] = 1.0;
        let mut lower = DVector::from_element(n, -1.0);
        lower[0] = f64::NEG_INFINITY;
        let mut upper = DVector::from_element(n, 1.0);
        upper[0] = f64::INFINITY;
        solver.set_objective_function(objective)?;
        solver.set_lower(lower)?;
        solver.set_upper(upper)?;

        let ball = Ellipsoid::ball(DVector::zeros(dim + 1), 1.0)?;
        Ok(Self {
            dim,
            cone: IncrementalPolyhedralCone::new(),
            ball,
            solver,
            sampler,
        })
    }

    /// Number of features (without the bias coordinate).
    #[inline]
    pub fn feature_dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.cone.len()
    }

    #[inline]
    pub fn cone(&self) -> &IncrementalPolyhedralCone {
        &self.cone
    }

    #[inline]
    pub fn sampler(&self) -> &HitAndRun {
        &self.sampler
    }

    /// `[1, x]`.
    pub fn homogeneous(&self, point: &DVector<f64>) -> Result<DVector<f64>, GeometryError> {
        check_dim(self.dim, point.len())?;
        Ok(DVector::from_fn(self.dim + 1, |i, _| {
            if i == 0 {
                1.0
            } else {
                point[i - 1]
            }
        }))
    }

    /// Keep only classifiers that give `point` the sign of `label`.
    pub fn add_constraint(
        &mut self,
        point: &DVector<f64>,
        label: Label,
    ) -> Result<(), VersionSpaceError> {
        let a = self.homogeneous(point)? * -label.sign();
        let lp_row = DVector::from_fn(self.dim + 2, |i, _| if i == 0 { -1.0 } else { a[i - 1] });
        self.solver.add_linear_constraint(lp_row, 0.0)?;
        self.cone.add_constraint(a)?;
        tracing::trace!(constraints = self.cone.len(), ?label, "version space constraint");
        Ok(())
    }

    /// A point strictly inside the version space (origin if unconstrained).
    ///
    /// The rescaled optimum is checked with `is_inside` before it is returned;
    /// a seed the body rejects is `Degenerate`.
    pub fn find_interior_point(&self) -> Result<DVector<f64>, VersionSpaceError> {
        if self.cone.is_empty() {
            return Ok(DVector::zeros(self.dim + 1));
        }
        let optimum = self.solver.find_minimizer()?;
        check_len(self.dim + 2, optimum.len())?;
        let slack = optimum[0];
        tracing::debug!(slack, constraints = self.cone.len(), "interior point LP");
        let w = optimum.rows(1, self.dim + 1).into_owned();
        let norm = w.norm();
        // Rescaling shrinks every cone margin by SEED_RADIUS / norm.
        if !(slack < -EQ_EPS) || !(slack * SEED_RADIUS / norm < -EQ_EPS) {
            return Err(VersionSpaceError::Degenerate { slack });
        }
        let seed = w * (SEED_RADIUS / norm);
        if !self.is_inside(&seed)? {
            tracing::debug!(slack, "interior point LP optimum rejected by membership");
            return Err(VersionSpaceError::Degenerate { slack });
        }
        Ok(seed)
    }

    /// `sample_size × (dim + 1)` approximately uniform classifiers.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<DMatrix<f64>, VersionSpaceError> {
        let seed = self.find_interior_point()?;
        Ok(self.sampler.sample_uniform(self, &seed, rng)?)
    }
}

impl<S: LinearProgramSolver> ConvexBody for LinearVersionSpace<S> {
    #[inline]
    fn dim(&self) -> usize {
        self.dim + 1
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        check_dim(self.dim + 1, point.len())?;
        Ok(self.ball.is_inside(point)? && self.cone.is_inside(point)?)
    }

    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        check_dim(self.dim + 1, line.dim())?;
        let ball = self.ball.intersect(line)?;
        let cone = self.cone.intersect(line)?;
        ball.intersect(&cone)
    }
}
