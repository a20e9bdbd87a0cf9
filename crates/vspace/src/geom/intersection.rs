//! Intersection of two convex bodies.

use nalgebra::DVector;

use super::{check_dim, ConvexBody, GeometryError, Line, LineSegment};

/// `first ∩ second`; both operands share one dimension.
///
/// An operand with `dim() == 0` (an empty `IncrementalPolyhedralCone`) has
/// no fixed dimension yet and constrains nothing, so it combines with any
/// other operand and the intersection takes the other operand's dimension.
///
/// Operands can be borrowed (`Intersection::new(&a, &b)`), boxed, or owned.
#[derive(Clone, Debug)]
pub struct Intersection<A, B> {
    first: A,
    second: B,
}

impl<A: ConvexBody, B: ConvexBody> Intersection<A, B> {
    pub fn new(first: A, second: B) -> Result<Self, GeometryError> {
        if first.dim() != 0 && second.dim() != 0 {
            check_dim(first.dim(), second.dim())?;
        }
        Ok(Self { first, second })
    }

    #[inline]
    pub fn first(&self) -> &A {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &B {
        &self.second
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }

    fn check_operand_dim(&self, actual: usize) -> Result<(), GeometryError> {
        match self.dim() {
            0 => Ok(()),
            expected => check_dim(expected, actual),
        }
    }
}

impl<A: ConvexBody, B: ConvexBody> ConvexBody for Intersection<A, B> {
    #[inline]
    fn dim(&self) -> usize {
        self.first.dim().max(self.second.dim())
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        self.check_operand_dim(point.len())?;
        Ok(self.first.is_inside(point)? && self.second.is_inside(point)?)
    }

    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        self.check_operand_dim(line.dim())?;
        let a = self.first.intersect(line)?;
        let b = self.second.intersect(line)?;
        a.intersect(&b)
    }
}
