//! Convex bodies in R^n (strict interiors, line clipping).
//!
//! Purpose
//! - One small trait, `ConvexBody`, answering the two questions Hit-and-Run
//!   needs: "is this point in the open interior?" and "which parameter
//!   interval of this line lies in the open interior?".
//! - Concrete bodies: `Hyperbox`, `Ellipsoid`, `Polytope`, `PolyhedralCone`,
//!   `IncrementalPolyhedralCone`, and the combinator `Intersection`.
//!
//! Conventions
//! - Membership is STRICT everywhere: boundary points are outside. `Hyperbox`
//!   uses `low < x < high`, `Ellipsoid` uses `Σ((x-c)/h)² < 1`, polytopes use
//!   `Ax < b`. The margin must exceed `EQ_EPS` (1e-10), so a point within
//!   1e-10 of the boundary counts as on it.
//! - Line clipping returns the open interval `(lower, upper)` of parameters `t`
//!   with `C + tD` inside; an empty or single-point interval is an error.
//! - Every operation checks dimensions before touching nalgebra (which would
//!   panic) and reports `DimensionMismatch` instead.

mod bodies;
mod cone;
mod intersection;
mod line;
mod polytope;

pub use bodies::{Ellipsoid, Hyperbox};
pub use cone::IncrementalPolyhedralCone;
pub use intersection::Intersection;
pub use line::{Line, LineSegment};
pub use polytope::{PolyhedralCone, Polytope};

pub(crate) use polytope::clip_halfspaces;

use nalgebra::DVector;

/// Errors surfaced by geometry construction, membership and line clipping.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Two operands have incompatible sizes.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Constructor arguments violate the body's invariants.
    #[error("invalid construction: {reason}")]
    InvalidConstruction { reason: String },
    /// The line misses the open interior (or touches it in a single point).
    #[error("line does not cross the interior of the body")]
    EmptyIntersection,
    /// Uniform sampling needs both segment bounds finite.
    #[error("cannot sample uniformly from unbounded segment ({lower}, {upper})")]
    UnboundedSegment { lower: f64, upper: f64 },
    /// A random-walk seed is not in the strict interior.
    #[error("initial point is not in the strict interior of the body")]
    PointOutsideBody,
}

impl GeometryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConstruction {
            reason: reason.into(),
        }
    }
}

/// Convex subset of R^dim with strict-interior membership and line clipping.
pub trait ConvexBody {
    /// Ambient dimension.
    fn dim(&self) -> usize;

    /// Whether `point` lies in the open interior.
    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError>;

    /// Parameter interval `(lower, upper)` of `line` inside the open interior.
    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError>;
}

impl<T: ConvexBody + ?Sized> ConvexBody for &T {
    #[inline]
    fn dim(&self) -> usize {
        (**self).dim()
    }
    #[inline]
    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        (**self).is_inside(point)
    }
    #[inline]
    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        (**self).intersect(line)
    }
}

impl<T: ConvexBody + ?Sized> ConvexBody for Box<T> {
    #[inline]
    fn dim(&self) -> usize {
        (**self).dim()
    }
    #[inline]
    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        (**self).is_inside(point)
    }
    #[inline]
    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        (**self).intersect(line)
    }
}

#[inline]
pub(crate) fn check_dim(expected: usize, actual: usize) -> Result<(), GeometryError> {
    if expected == actual {
        Ok(())
    } else {
        Err(GeometryError::DimensionMismatch { expected, actual })
    }
}
