//! Append-only polyhedral cone `{ x : a_i·x < 0 ∀i }`.

use nalgebra::DVector;

use super::{check_dim, clip_halfspaces, ConvexBody, GeometryError, Line, LineSegment};
use crate::cfg::EQ_EPS;

/// Polyhedral cone grown one constraint at a time.
///
/// Invariants:
/// - Constraints are never removed; insertion order is preserved.
/// - `dim()` is 0 until the first constraint fixes it; every later constraint
///   must match.
/// - With no constraints the cone is the whole space: every point is inside
///   and every line is kept whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IncrementalPolyhedralCone {
    rows: Vec<DVector<f64>>,
}

impl IncrementalPolyhedralCone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<DVector<f64>>) -> Result<Self, GeometryError> {
        let mut cone = Self::new();
        for r in rows {
            cone.add_constraint(r)?;
        }
        Ok(cone)
    }

    /// Append `a` as the constraint `a·x < 0`.
    pub fn add_constraint(&mut self, a: DVector<f64>) -> Result<(), GeometryError> {
        if a.is_empty() {
            return Err(GeometryError::invalid("constraint dimension must be > 0"));
        }
        if let Some(first) = self.rows.first() {
            check_dim(first.len(), a.len())?;
        }
        tracing::trace!(index = self.rows.len(), dim = a.len(), "cone constraint");
        self.rows.push(a);
        Ok(())
    }

    #[inline]
    pub fn constraints(&self) -> &[DVector<f64>] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ConvexBody for IncrementalPolyhedralCone {
    #[inline]
    fn dim(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        if self.is_empty() {
            return Ok(true);
        }
        check_dim(self.dim(), point.len())?;
        Ok(self.rows.iter().all(|a| a.dot(point) < -EQ_EPS))
    }

    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        if self.is_empty() {
            return Ok(LineSegment::unbounded(line.clone()));
        }
        check_dim(self.dim(), line.dim())?;
        let rows = self
            .rows
            .iter()
            .map(|a| (-a.dot(line.center()), a.dot(line.direction())));
        clip_halfspaces(line, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn wedge() -> IncrementalPolyhedralCone {
        IncrementalPolyhedralCone::from_rows(vec![dvector![-1.0, -1.0], dvector![1.0, -1.0]])
            .unwrap()
    }

    #[test]
    fn dimension_is_fixed_by_first_constraint() {
        let mut cone = IncrementalPolyhedralCone::new();
        assert_eq!(cone.dim(), 0);
        assert!(cone.is_empty());
        cone.add_constraint(dvector![1.0, 0.0, 0.0]).unwrap();
        assert_eq!(cone.dim(), 3);
        assert_eq!(
            cone.add_constraint(dvector![1.0, 0.0]),
            Err(GeometryError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(cone.len(), 1);
        assert!(cone.add_constraint(DVector::zeros(0)).is_err());
    }

    #[test]
    fn wedge_membership_with_boundary() {
        let cone = wedge();
        assert!(cone.is_inside(&dvector![0.0, 1.0]).unwrap());
        // (-1, 1) satisfies -x - y = 0, which is on the boundary.
        assert!(!cone.is_inside(&dvector![-1.0, 1.0]).unwrap());
        assert!(!cone.is_inside(&dvector![-2.0, 1.0]).unwrap());
        assert!(cone.is_inside(&dvector![0.0, 1.0, 0.0]).is_err());
    }

    #[test]
    fn wedge_ray_intersection() {
        let cone = wedge();
        // Vertical line through the interior point (0, 1).
        let l = Line::new(dvector![0.0, 1.0], dvector![0.0, 1.0]).unwrap();
        let s = cone.intersect(&l).unwrap();
        assert_eq!(s.lower(), -1.0);
        assert_eq!(s.upper(), f64::INFINITY);

        // Same direction through the apex: the interval starts at t = 0.
        let apex = Line::new(dvector![0.0, 0.0], dvector![0.0, 1.0]).unwrap();
        let s = cone.intersect(&apex).unwrap();
        assert_eq!(s.lower(), 0.0);
        assert_eq!(s.upper(), f64::INFINITY);

        // A horizontal line below the apex never enters the wedge.
        let l2 = Line::new(dvector![0.0, -1.0], dvector![1.0, 0.0]).unwrap();
        assert_eq!(cone.intersect(&l2), Err(GeometryError::EmptyIntersection));
    }

    #[test]
    fn parallel_constraint_outside_is_empty() {
        let cone = IncrementalPolyhedralCone::from_rows(vec![dvector![0.0, 1.0]]).unwrap();
        // a·D = 0 and a·C = 2 >= 0.
        let l = Line::new(dvector![0.0, 2.0], dvector![1.0, 0.0]).unwrap();
        assert_eq!(cone.intersect(&l), Err(GeometryError::EmptyIntersection));
    }

    #[test]
    fn empty_cone_is_whole_space() {
        let cone = IncrementalPolyhedralCone::new();
        assert!(cone.is_inside(&dvector![5.0, -3.0]).unwrap());
        let l = Line::new(dvector![1.0, 1.0], dvector![0.0, 1.0]).unwrap();
        let s = cone.intersect(&l).unwrap();
        assert!(s.lower().is_infinite() && s.upper().is_infinite());
        assert!(!s.is_bounded());
    }
}
