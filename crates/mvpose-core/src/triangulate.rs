use nalgebra::{DMatrix, DVector};

use crate::{DltCamera, LikelihoodPolicy, Marker2D, Point3D, ReconError};

/// Minimum number of camera views required for triangulation.
pub const MIN_VIEWS: usize = 2;

/// Singular values below `RANK_EPS * s_max` count as zero when ranking the
/// least-squares system.
const RANK_EPS: f64 = 1e-12;

/// Triangulate a 3D point from 2D observations in two or more views.
///
/// Each camera/marker pair contributes two linear equations in `(x, y, z)`,
/// obtained by cross-multiplying the DLT forward model:
///
/// ```text
/// (c1 - u*c9)*x + (c2 - u*c10)*y + (c3 - u*c11)*z = u - c4
/// (c5 - v*c9)*x + (c6 - v*c10)*y + (c7 - v*c11)*z = v - c8
/// ```
///
/// The stacked `2N x 3` system is solved in the least-squares sense via SVD.
/// A rank-deficient system (all rays through one line) fails with
/// [`ReconError::DegenerateGeometry`]. Near-collinear but full-rank
/// configurations are *not* detected; the estimate degrades gracefully and
/// callers judge it by reprojection error.
///
/// The output likelihood combines the contributing observations' likelihoods
/// with `policy` (min by default).
pub fn triangulate(
    views: &[(&DltCamera, Marker2D)],
    policy: LikelihoodPolicy,
) -> Result<Point3D, ReconError> {
    if views.len() < MIN_VIEWS {
        return Err(ReconError::InsufficientViews {
            needed: MIN_VIEWS,
            got: views.len(),
        });
    }

    let mut a = DMatrix::<f64>::zeros(2 * views.len(), 3);
    let mut b = DVector::<f64>::zeros(2 * views.len());

    for (i, (camera, marker)) in views.iter().enumerate() {
        let c = camera.coefficients();
        let (u, v) = (marker.x, marker.y);

        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = c[0] - u * c[8];
        a[(r0, 1)] = c[1] - u * c[9];
        a[(r0, 2)] = c[2] - u * c[10];
        b[r0] = u - c[3];

        a[(r1, 0)] = c[4] - v * c[8];
        a[(r1, 1)] = c[5] - v * c[9];
        a[(r1, 2)] = c[6] - v * c[10];
        b[r1] = v - c[7];
    }

    let svd = a.svd(true, true);
    let s_max = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
    if svd.rank(RANK_EPS * s_max.max(1.0)) < 3 {
        return Err(ReconError::DegenerateGeometry {
            context: format!("singular triangulation system ({} views)", views.len()),
        });
    }
    let solution = svd
        .solve(&b, RANK_EPS * s_max.max(1.0))
        .map_err(|e| ReconError::DegenerateGeometry {
            context: format!("least-squares solve failed: {e}"),
        })?;

    let likelihoods: Vec<f64> = views.iter().map(|(_, m)| m.likelihood).collect();
    Ok(Point3D::new(
        solution[0],
        solution[1],
        solution[2],
        policy.combine(&likelihoods),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_cams::synthetic_camera;

    fn observe(camera: &DltCamera, point: &Point3D, likelihood: f64) -> Marker2D {
        let mut m = camera.project(point).unwrap();
        m.likelihood = likelihood;
        m
    }

    #[test]
    fn rejects_zero_and_one_view() {
        let cam = synthetic_camera("cam0", 800.0, (640.0, 360.0), 0.0, (0.0, 0.0, 50.0));
        let marker = Marker2D::new(640.0, 360.0, 0.9);

        let err = triangulate(&[], LikelihoodPolicy::Min).unwrap_err();
        assert_eq!(err, ReconError::InsufficientViews { needed: 2, got: 0 });

        let err = triangulate(&[(&cam, marker)], LikelihoodPolicy::Min).unwrap_err();
        assert_eq!(err, ReconError::InsufficientViews { needed: 2, got: 1 });
    }

    #[test]
    fn two_views_recover_point() {
        let cam0 = synthetic_camera("cam0", 800.0, (640.0, 360.0), 0.0, (0.0, 0.0, 60.0));
        let cam1 = synthetic_camera("cam1", 800.0, (640.0, 360.0), 0.5, (5.0, 0.0, 60.0));

        let truth = Point3D::new(1.5, -2.0, 4.0, 1.0);
        let views = [
            (&cam0, observe(&cam0, &truth, 0.95)),
            (&cam1, observe(&cam1, &truth, 0.9)),
        ];

        let est = triangulate(&views, LikelihoodPolicy::Min).unwrap();
        assert!(est.distance(&truth) < 1e-6, "error {}", est.distance(&truth));
        assert!((est.likelihood - 0.9).abs() < 1e-12);
    }

    #[test]
    fn three_views_concrete_scenario() {
        let cam0 = synthetic_camera("cam0", 900.0, (640.0, 360.0), 0.0, (0.0, 0.0, 80.0));
        let cam1 = synthetic_camera("cam1", 900.0, (640.0, 360.0), 0.7, (10.0, 0.0, 80.0));
        let cam2 = synthetic_camera("cam2", 900.0, (640.0, 360.0), -0.6, (-8.0, 2.0, 75.0));

        let truth = Point3D::new(10.0, 20.0, 5.0, 1.0);
        let views = [
            (&cam0, observe(&cam0, &truth, 0.99)),
            (&cam1, observe(&cam1, &truth, 0.98)),
            (&cam2, observe(&cam2, &truth, 0.97)),
        ];

        let est = triangulate(&views, LikelihoodPolicy::Min).unwrap();
        assert!((est.x - 10.0).abs() < 1e-4);
        assert!((est.y - 20.0).abs() < 1e-4);
        assert!((est.z - 5.0).abs() < 1e-4);
    }

    #[test]
    fn identical_views_are_degenerate() {
        // Two copies of the same camera see the same pixel: the rays
        // coincide and depth is unobservable.
        let cam = synthetic_camera("cam0", 800.0, (640.0, 360.0), 0.0, (0.0, 0.0, 60.0));
        let truth = Point3D::new(1.0, 1.0, 1.0, 1.0);
        let marker = observe(&cam, &truth, 0.9);

        let err = triangulate(&[(&cam, marker), (&cam, marker)], LikelihoodPolicy::Min)
            .unwrap_err();
        assert!(matches!(err, ReconError::DegenerateGeometry { .. }));
    }

    #[test]
    fn likelihood_policy_is_applied() {
        let cam0 = synthetic_camera("cam0", 800.0, (640.0, 360.0), 0.0, (0.0, 0.0, 60.0));
        let cam1 = synthetic_camera("cam1", 800.0, (640.0, 360.0), 0.4, (5.0, 0.0, 60.0));
        let truth = Point3D::new(0.5, 0.5, 2.0, 1.0);
        let views = [
            (&cam0, observe(&cam0, &truth, 0.8)),
            (&cam1, observe(&cam1, &truth, 0.6)),
        ];

        let est = triangulate(&views, LikelihoodPolicy::Mean).unwrap();
        assert!((est.likelihood - 0.7).abs() < 1e-12);
    }
}
