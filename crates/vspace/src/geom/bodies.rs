//! Axis-aligned boxes and axis-aligned ellipsoids.

use nalgebra::DVector;

use super::{check_dim, clip_halfspaces, ConvexBody, GeometryError, Line, LineSegment};
use crate::cfg::EQ_EPS;

/// Open box `{ x : low < x < high }` (componentwise).
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperbox {
    low: DVector<f64>,
    high: DVector<f64>,
}

impl Hyperbox {
    pub fn new(low: DVector<f64>, high: DVector<f64>) -> Result<Self, GeometryError> {
        if low.is_empty() {
            return Err(GeometryError::invalid("box dimension must be > 0"));
        }
        check_dim(low.len(), high.len())?;
        if low.iter().zip(high.iter()).any(|(l, h)| !(l < h)) {
            return Err(GeometryError::invalid("box requires low < high componentwise"));
        }
        Ok(Self { low, high })
    }

    /// `(-half_width, half_width)^dim`.
    pub fn cube(dim: usize, half_width: f64) -> Result<Self, GeometryError> {
        if !(half_width > 0.0) {
            return Err(GeometryError::invalid("cube half width must be > 0"));
        }
        Self::new(
            DVector::from_element(dim, -half_width),
            DVector::from_element(dim, half_width),
        )
    }

    #[inline]
    pub fn low(&self) -> &DVector<f64> {
        &self.low
    }

    #[inline]
    pub fn high(&self) -> &DVector<f64> {
        &self.high
    }
}

impl ConvexBody for Hyperbox {
    #[inline]
    fn dim(&self) -> usize {
        self.low.len()
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        check_dim(self.dim(), point.len())?;
        Ok(point
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(x, (l, h))| x - l > EQ_EPS && h - x > EQ_EPS))
    }

    /// Each coordinate contributes two half-spaces: `x_i < high_i`, `-x_i < -low_i`.
    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        check_dim(self.dim(), line.dim())?;
        let c = line.center();
        let d = line.direction();
        let rows = (0..self.dim()).flat_map(|i| {
            [
                (self.high[i] - c[i], d[i]),
                (c[i] - self.low[i], -d[i]),
            ]
        });
        clip_halfspaces(line, rows)
    }
}

/// Open axis-aligned ellipsoid `{ x : Σ ((x_i - c_i) / h_i)² < 1 }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    center: DVector<f64>,
    half_axes: DVector<f64>,
}

impl Ellipsoid {
    pub fn new(
        center: DVector<f64>,
        half_axis_lengths: DVector<f64>,
    ) -> Result<Self, GeometryError> {
        if center.is_empty() {
            return Err(GeometryError::invalid("ellipsoid dimension must be > 0"));
        }
        check_dim(center.len(), half_axis_lengths.len())?;
        if half_axis_lengths.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
            return Err(GeometryError::invalid(
                "ellipsoid half-axis lengths must be finite and > 0",
            ));
        }
        Ok(Self {
            center,
            half_axes: half_axis_lengths,
        })
    }

    /// Euclidean ball of `radius` around `center`.
    pub fn ball(center: DVector<f64>, radius: f64) -> Result<Self, GeometryError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeometryError::invalid("ball radius must be finite and > 0"));
        }
        let half_axes = DVector::from_element(center.len(), radius);
        Self::new(center, half_axes)
    }

    #[inline]
    pub fn center(&self) -> &DVector<f64> {
        &self.center
    }

    #[inline]
    pub fn half_axis_lengths(&self) -> &DVector<f64> {
        &self.half_axes
    }

    /// Coordinates in which the ellipsoid is the unit ball.
    #[inline]
    fn normalize(&self, x: &DVector<f64>) -> DVector<f64> {
        (x - &self.center).component_div(&self.half_axes)
    }
}

impl ConvexBody for Ellipsoid {
    #[inline]
    fn dim(&self) -> usize {
        self.center.len()
    }

    fn is_inside(&self, point: &DVector<f64>) -> Result<bool, GeometryError> {
        check_dim(self.dim(), point.len())?;
        Ok(1.0 - self.normalize(point).norm_squared() > EQ_EPS)
    }

    /// Solves `|u + t v|² = 1` for `u = (C - c)/h`, `v = D/h`.
    ///
    /// Roots use the cancellation-free form `q = -(b + sign(b)·√Δ)/2`,
    /// `t₁ = q/a`, `t₂ = c₀/q`.
    fn intersect(&self, line: &Line) -> Result<LineSegment, GeometryError> {
        check_dim(self.dim(), line.dim())?;
        let u = self.normalize(line.center());
        let v = line.direction().component_div(&self.half_axes);
        let a = v.norm_squared();
        let b = 2.0 * u.dot(&v);
        let c0 = u.norm_squared() - 1.0;
        let disc = b * b - 4.0 * a * c0;
        if !(disc > 0.0) || a <= 0.0 {
            return Err(GeometryError::EmptyIntersection);
        }
        let sign = if b >= 0.0 { 1.0 } else { -1.0 };
        let q = -0.5 * (b + sign * disc.sqrt());
        let (t1, t2) = (q / a, c0 / q);
        let (lower, upper) = (t1.min(t2), t1.max(t2));
        if !(lower < upper) {
            return Err(GeometryError::EmptyIntersection);
        }
        LineSegment::new(line.clone(), lower, upper)
    }
}
