//! Convex bodies, Hit-and-Run sampling and linear version spaces.
//!
//! Layout
//! - `geom`: lines, segments and the `ConvexBody` family (boxes, ellipsoids,
//!   polytopes, cones, intersections) with exact line clipping.
//! - `sampling`: Hit-and-Run over any `ConvexBody`.
//! - `lp`: the narrow linear-program interface and a dense simplex backend.
//! - `version_space`: classifiers consistent with labelled data, sampled
//!   uniformly for active learning.
//!
//! Conventions
//! - Dynamic dimension everywhere (`nalgebra::DVector`/`DMatrix`); mismatches
//!   are errors, never panics.
//! - Membership is strict: boundary points are outside.
//! - Samples are returned row-wise, one point per row.

pub(crate) mod cfg;
pub mod geom;
pub mod lp;
pub mod sampling;
pub mod version_space;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom::{ConvexBody, GeometryError, Line, LineSegment};
pub use lp::{LinearProgramSolver, LpError, SimplexSolver};
pub use sampling::HitAndRun;
pub use version_space::{Label, LinearVersionSpace, VersionSpaceError};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom::{
        ConvexBody, Ellipsoid, GeometryError, Hyperbox, IncrementalPolyhedralCone, Intersection,
        Line, LineSegment, PolyhedralCone, Polytope,
    };
    pub use crate::lp::{LinearProgramSolver, LpError, SimplexCfg, SimplexSolver};
    pub use crate::sampling::HitAndRun;
    pub use crate::version_space::{Label, LinearVersionSpace, VersionSpaceError};
    pub use nalgebra::{DMatrix, DVector};
}
