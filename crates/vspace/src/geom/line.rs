//! Lines `{C + tD}` and open parameter intervals on them.

use nalgebra::DVector;
use rand::distributions::Open01;
use rand::Rng;
use rand_distr::StandardNormal;

use super::{check_dim, GeometryError};
use crate::cfg::EQ_EPS;

/// Line `{ C + t D : t ∈ R }` with nonzero direction.
///
/// Invariants:
/// - `center` and `direction` share a dimension `> 0`.
/// - `direction` has at least one component with `|d_i| > EQ_EPS`.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    center: DVector<f64>,
    direction: DVector<f64>,
}

impl Line {
    pub fn new(center: DVector<f64>, direction: DVector<f64>) -> Result<Self, GeometryError> {
        if center.is_empty() {
            return Err(GeometryError::invalid("line dimension must be > 0"));
        }
        check_dim(center.len(), direction.len())?;
        if direction.iter().all(|d| d.abs() <= EQ_EPS) {
            return Err(GeometryError::invalid("line direction is the zero vector"));
        }
        Ok(Self { center, direction })
    }

    /// Random line through `point` with i.i.d. standard-normal direction
    /// (uniform on the sphere after normalization, left unnormalized).
    pub fn sample<R: Rng>(point: &DVector<f64>, rng: &mut R) -> Result<Self, GeometryError> {
        let direction = DVector::from_fn(point.len(), |_, _| rng.sample::<f64, _>(StandardNormal));
        Self::new(point.clone(), direction)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.center.len()
    }

    #[inline]
    pub fn center(&self) -> &DVector<f64> {
        &self.center
    }

    #[inline]
    pub fn direction(&self) -> &DVector<f64> {
        &self.direction
    }

    /// `C + t D`.
    #[inline]
    pub fn get_point(&self, t: f64) -> DVector<f64> {
        &self.center + &self.direction * t
    }
}

/// Open interval `(lower, upper)` of line parameters; bounds may be infinite.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    line: Line,
    lower: f64,
    upper: f64,
}

impl LineSegment {
    /// Fails unless `lower < upper` (NaN bounds fail as well).
    pub fn new(line: Line, lower: f64, upper: f64) -> Result<Self, GeometryError> {
        if !(lower < upper) {
            return Err(GeometryError::invalid(format!(
                "segment bounds must satisfy lower < upper, got ({lower}, {upper})"
            )));
        }
        Ok(Self { line, lower, upper })
    }

    /// The whole line, `(-∞, +∞)`.
    pub fn unbounded(line: Line) -> Self {
        Self {
            line,
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    #[inline]
    pub fn line(&self) -> &Line {
        &self.line
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.line.dim()
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Euclidean length of the segment (infinite when unbounded).
    pub fn length(&self) -> f64 {
        (self.upper - self.lower) * self.line.direction.norm()
    }

    #[inline]
    pub fn get_point(&self, t: f64) -> DVector<f64> {
        self.line.get_point(t)
    }

    /// Slab composition with another interval on the same line.
    ///
    /// Both segments must parameterize the same line; only the dimension is
    /// checked here.
    pub fn intersect(&self, other: &LineSegment) -> Result<LineSegment, GeometryError> {
        check_dim(self.dim(), other.dim())?;
        debug_assert_eq!(self.line, other.line, "segments live on different lines");
        let lower = self.lower.max(other.lower);
        let upper = self.upper.min(other.upper);
        if lower >= upper {
            return Err(GeometryError::EmptyIntersection);
        }
        Ok(Self {
            line: self.line.clone(),
            lower,
            upper,
        })
    }

    /// Uniform parameter in the open interval.
    pub fn sample_parameter<R: Rng>(&self, rng: &mut R) -> Result<f64, GeometryError> {
        if !self.is_bounded() {
            return Err(GeometryError::UnboundedSegment {
                lower: self.lower,
                upper: self.upper,
            });
        }
        let u: f64 = rng.sample(Open01);
        Ok(self.lower + (self.upper - self.lower) * u)
    }

    /// Uniform point on the open segment.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<DVector<f64>, GeometryError> {
        let t = self.sample_parameter(rng)?;
        Ok(self.line.get_point(t))
    }
}
