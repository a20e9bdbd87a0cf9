use super::*;
use crate::geom::{Ellipsoid, Hyperbox, IncrementalPolyhedralCone, Intersection, Polytope};
use nalgebra::{dmatrix, dvector};
use rand::{rngs::StdRng, SeedableRng};

fn rows_inside<B: ConvexBody>(body: &B, m: &DMatrix<f64>) -> bool {
    m.row_iter()
        .all(|r| body.is_inside(&r.transpose()).unwrap())
}

#[test]
fn rejects_non_positive_sizes() {
    assert!(matches!(
        HitAndRun::new(0, 10),
        Err(GeometryError::InvalidConstruction { .. })
    ));
    assert!(matches!(
        HitAndRun::new(10, 0),
        Err(GeometryError::InvalidConstruction { .. })
    ));
    let hr = HitAndRun::new(3, 4).unwrap();
    assert_eq!((hr.chain_length(), hr.sample_size()), (3, 4));
}

#[test]
fn rejects_seed_outside_or_mismatched() {
    let body = Hyperbox::cube(2, 1.0).unwrap();
    let hr = HitAndRun::new(5, 5).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let outside = dvector![1.0, 0.0];
    assert_eq!(
        hr.sample_chain(&body, &outside, &mut rng),
        Err(GeometryError::PointOutsideBody)
    );
    assert_eq!(
        hr.sample_uniform(&body, &outside, &mut rng),
        Err(GeometryError::PointOutsideBody)
    );
    let wrong_dim = dvector![0.0, 0.0, 0.0];
    assert_eq!(
        hr.sample_uniform(&body, &wrong_dim, &mut rng),
        Err(GeometryError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn chain_starts_at_seed_and_stays_inside() {
    let body = Polytope::new(
        dmatrix![-1.0, 0.0; 0.0, -1.0; 1.0, 1.0],
        dvector![0.0, 0.0, 1.0],
    )
    .unwrap();
    let hr = HitAndRun::new(50, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let seed = dvector![0.2, 0.2];
    let chain = hr.sample_chain(&body, &seed, &mut rng).unwrap();
    assert_eq!(chain.shape(), (51, 2));
    assert_eq!(chain.row(0).transpose(), seed);
    assert!(rows_inside(&body, &chain));
}

#[test]
fn uniform_sample_shape_and_membership() {
    let body = Intersection::new(
        Hyperbox::cube(3, 1.0).unwrap(),
        Ellipsoid::ball(dvector![0.5, 0.0, 0.0], 1.0).unwrap(),
    )
    .unwrap();
    let hr = HitAndRun::new(10, 25).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let samples = hr
        .sample_uniform(&body, &dvector![0.5, 0.0, 0.0], &mut rng)
        .unwrap();
    assert_eq!(samples.shape(), (25, 3));
    assert!(rows_inside(&body, &samples));
}

#[test]
fn independent_chains_restart_from_seed_not_origin() {
    // The origin is outside this box; restarting there would fail every step.
    let body = Hyperbox::new(dvector![5.0, 5.0], dvector![6.0, 6.0]).unwrap();
    let hr = HitAndRun::new(5, 40).unwrap();
    let mut rng = StdRng::seed_from_u64(4);
    let samples = hr
        .sample_uniform(&body, &dvector![5.5, 5.5], &mut rng)
        .unwrap();
    assert!(rows_inside(&body, &samples));
}

#[test]
fn cube_samples_look_uniform() {
    let body = Hyperbox::cube(2, 1.0).unwrap();
    let hr = HitAndRun::new(20, 2000).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let samples = hr
        .sample_uniform(&body, &dvector![0.9, -0.9], &mut rng)
        .unwrap();
    let n = samples.nrows() as f64;
    let mean_x = samples.column(0).sum() / n;
    let mean_y = samples.column(1).sum() / n;
    assert!(mean_x.abs() < 0.1, "mean_x = {mean_x}");
    assert!(mean_y.abs() < 0.1, "mean_y = {mean_y}");
    let positive_quadrant = samples
        .row_iter()
        .filter(|r| r[0] > 0.0 && r[1] > 0.0)
        .count() as f64
        / n;
    assert!((positive_quadrant - 0.25).abs() < 0.05);
}

#[test]
fn unbounded_body_fails_the_step() {
    let cone = IncrementalPolyhedralCone::from_rows(vec![dvector![0.0, -1.0]]).unwrap();
    let hr = HitAndRun::new(1, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(6);
    let err = hr
        .sample_uniform(&cone, &dvector![0.0, 1.0], &mut rng)
        .unwrap_err();
    assert!(matches!(err, GeometryError::UnboundedSegment { .. }));
}
