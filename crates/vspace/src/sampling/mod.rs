//! Hit-and-Run sampling from convex bodies.
//!
//! Purpose
//! - Approximately uniform samples from any `ConvexBody` given one strict
//!   interior point.
//!
//! Model
//! - One step: draw a random line through the current point (Gaussian
//!   direction), clip it against the body, move to a uniform parameter on the
//!   clipped open segment.
//! - `sample_chain` returns every state of one chain (burn-in diagnostics).
//! - `sample_uniform` runs `sample_size` fresh chains of `chain_length` steps,
//!   each restarted from the validated seed, and keeps the last state of each.
//!
//! Failure policy
//! - A step whose line misses the body or clips to an unbounded segment fails
//!   the whole call. Nothing is retried here; callers decide.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::geom::{check_dim, ConvexBody, GeometryError, Line};

/// Hit-and-Run sampler configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitAndRun {
    chain_length: usize,
    sample_size: usize,
}

impl HitAndRun {
    /// Both `chain_length` and `sample_size` must be positive.
    pub fn new(chain_length: usize, sample_size: usize) -> Result<Self, GeometryError> {
        if chain_length == 0 {
            return Err(GeometryError::invalid("chain_length must be > 0"));
        }
        if sample_size == 0 {
            return Err(GeometryError::invalid("sample_size must be > 0"));
        }
        Ok(Self {
            chain_length,
            sample_size,
        })
    }

    #[inline]
    pub fn chain_length(&self) -> usize {
        self.chain_length
    }

    #[inline]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// One Hit-and-Run transition from `point` (not re-validated).
    pub fn step<B, R>(
        body: &B,
        point: &DVector<f64>,
        rng: &mut R,
    ) -> Result<DVector<f64>, GeometryError>
    where
        B: ConvexBody + ?Sized,
        R: Rng,
    {
        let line = Line::sample(point, rng)?;
        let segment = body.intersect(&line)?;
        segment.sample(rng)
    }

    /// Full chain including the start: `chain_length + 1` rows of width `dim`.
    pub fn sample_chain<B, R>(
        &self,
        body: &B,
        initial_point: &DVector<f64>,
        rng: &mut R,
    ) -> Result<DMatrix<f64>, GeometryError>
    where
        B: ConvexBody + ?Sized,
        R: Rng,
    {
        validate_seed(body, initial_point)?;
        tracing::debug!(dim = body.dim(), chain_length = self.chain_length, "hit-and-run chain");
        let mut chain = DMatrix::zeros(self.chain_length + 1, initial_point.len());
        chain.set_row(0, &initial_point.transpose());
        let mut current = initial_point.clone();
        for i in 1..=self.chain_length {
            current = Self::step(body, &current, rng)?;
            chain.set_row(i, &current.transpose());
        }
        Ok(chain)
    }

    /// `sample_size` rows, each the endpoint of a fresh `chain_length`-step
    /// chain started at `initial_point`.
    pub fn sample_uniform<B, R>(
        &self,
        body: &B,
        initial_point: &DVector<f64>,
        rng: &mut R,
    ) -> Result<DMatrix<f64>, GeometryError>
    where
        B: ConvexBody + ?Sized,
        R: Rng,
    {
        validate_seed(body, initial_point)?;
        tracing::debug!(
            dim = body.dim(),
            chain_length = self.chain_length,
            sample_size = self.sample_size,
            "hit-and-run uniform sample"
        );
        let mut samples = DMatrix::zeros(self.sample_size, initial_point.len());
        for i in 0..self.sample_size {
            let mut current = initial_point.clone();
            for _ in 0..self.chain_length {
                current = Self::step(body, &current, rng)?;
            }
            samples.set_row(i, &current.transpose());
        }
        Ok(samples)
    }
}

fn validate_seed<B>(body: &B, point: &DVector<f64>) -> Result<(), GeometryError>
where
    B: ConvexBody + ?Sized,
{
    check_dim(body.dim(), point.len())?;
    if !body.is_inside(point)? {
        return Err(GeometryError::PointOutsideBody);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
