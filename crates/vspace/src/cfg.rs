//! Tolerance defaults (internal).
//!
//! Policy
//! - Fixed constants, no runtime knobs. `EQ_EPS` is the boundary band of every
//!   membership test and the zero threshold for line directions and the
//!   version-space slack certificate.

/// Equality tolerance: components within `EQ_EPS` of zero count as zero.
pub(crate) const EQ_EPS: f64 = 1e-10;

/// Radius the version-space seed is rescaled to (inside the unit ball).
pub(crate) const SEED_RADIUS: f64 = 0.5;
