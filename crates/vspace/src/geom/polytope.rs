//! H-representation polytopes `{ x : Ax < b }` and cones `{ x : Ax < 0 }`.

use nalgebra::{DMatrix, DVector};

use super::{check_dim, ConvexBody, GeometryError, Line, LineSegment};
use crate::cfg::EQ_EPS;

/// Clip `line` against strict half-spaces given as `(num, den)` pairs.
///
/// Each pair encodes `a·(C + tD) < b` as `t·den < num` with
/// `num = b - a·C` and `den = a·D`:
/// - `den > 0` tightens the upper bound to `num/den`,
/// - `den < 0` tightens the lower bound to `num/den`,
/// - `den == 0` is independent of `t`; `num <= 0` means the line never
///   satisfies it and the scan stops with `EmptyIntersection`.
///
/// No rows yields the whole line.
pub(crate) fn clip_halfspaces<I>(line: &Line, rows: I) -> Result<LineSegment, GeometryError>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut lower = f64::NEG_INFINITY;
    let mut upper = f64::INFINITY;
    for (num, den) in rows {
        if den > 0.0 {
            upper = upper.min(num / den);
        } else if den < 0.0 {
            lower = lower.max(num / den);
        } else if num <= 0.0 {
            return Err(GeometryError::EmptyIntersection);
        }
    }
    if lower >= upper {
        return Err(GeometryError::EmptyIntersection);
    }
    LineSegment::new(line.clone(), lower, upper)
}

fn matrix_from_rows(rows: &[DVector<f64>]) -> Result<DMatrix<f64>, GeometryError> {
    let Some(first) = rows.first() else {
        return Err(GeometryError::invalid("need at least one constraint row"));
    };
    let n = first.len();
    for r in rows {
        check_dim(n, r.len())?;
    }
    Ok(DMatrix::from_fn(rows.len(), n, |i, j| rows[i][j]))
}

/// Open polytope `{ x : Ax < b }` with `A` of shape `m × n`.
#[derive(Clone, Debug, PartialEq)]
pub struct Polytope {
    a: DMatrix<f64>,
    b: DVector<f64>,
}

impl Polytope {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self, GeometryError> {
        if a.ncols() == 0 {
            return Err(GeometryError::invalid("polytope dimension must be > 0"));
        }
        check_dim(a.nrows(), b.len())?;
        Ok(Self { a, b })
    }

    /// Stack `rows` into `A`; all rows must share one dimension.
    pub fn from_rows(rows: &[DVector<f64>], b: DVector<f64>) -> Result<Self, GeometryError> {
        Self::new(matrix_from_rows(rows)?, b)
    }

    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.a.nrows()
    }
}

impl ConvexBody for Polytope {
    #[inline]
    fn dim(&self) -> usize {
        self.a.ncols()
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        check_dim(self.dim(), point.len())?;
        let ax = &self.a * point;
        Ok(ax.iter().zip(self.b.iter()).all(|(l, r)| r - l > EQ_EPS))
    }

    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        check_dim(self.dim(), line.dim())?;
        let ac = &self.a * line.center();
        let ad = &self.a * line.direction();
        let rows = (0..self.num_constraints()).map(|i| (self.b[i] - ac[i], ad[i]));
        clip_halfspaces(line, rows)
    }
}

/// Open polyhedral cone `{ x : Ax < 0 }`.
#[derive(Clone, Debug, PartialEq)]
pub struct PolyhedralCone {
    a: DMatrix<f64>,
}

impl PolyhedralCone {
    pub fn new(a: DMatrix<f64>) -> Result<Self, GeometryError> {
        if a.ncols() == 0 {
            return Err(GeometryError::invalid("cone dimension must be > 0"));
        }
        Ok(Self { a })
    }

    pub fn from_rows(rows: &[DVector<f64>]) -> Result<Self, GeometryError> {
        Self::new(matrix_from_rows(rows)?)
    }

    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.a.nrows()
    }

    /// The same set as a general polytope with `b = 0`.
    pub fn to_polytope(&self) -> Polytope {
        Polytope {
            a: self.a.clone(),
            b: DVector::zeros(self.a.nrows()),
        }
    }
}

impl ConvexBody for PolyhedralCone {
    #[inline]
    fn dim(&self) -> usize {
        self.a.ncols()
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        check_dim(self.dim(), point.len())?;
        Ok((&self.a * point).iter().all(|v| *v < -EQ_EPS))
    }

    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        check_dim(self.dim(), line.dim())?;
        let ac = &self.a * line.center();
        let ad = &self.a * line.direction();
        clip_halfspaces(line, ac.iter().zip(ad.iter()).map(|(c, d)| (-c, *d)))
    }
}
