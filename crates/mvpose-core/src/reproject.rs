use crate::{DltCamera, Marker2D, Point3D, ReconError};

/// Project a 3D point into every camera's image plane.
///
/// Errors if any camera's projection is degenerate at the point; partial
/// results are never returned.
pub fn reproject(point: &Point3D, cameras: &[&DltCamera]) -> Result<Vec<Marker2D>, ReconError> {
    cameras.iter().map(|cam| cam.project(point)).collect()
}

/// Aggregate squared reprojection error of a 3D estimate against observed
/// markers, summed over all given views, in pixels squared.
pub fn reprojection_error(
    point: &Point3D,
    views: &[(&DltCamera, Marker2D)],
) -> Result<f64, ReconError> {
    let mut total = 0.0;
    for (camera, observed) in views {
        let predicted = camera.project(point)?;
        let d = predicted.distance(observed);
        total += d * d;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_cams::synthetic_camera;
    use crate::{triangulate, LikelihoodPolicy};

    #[test]
    fn round_trip_reproject_then_triangulate() {
        let cam0 = synthetic_camera("cam0", 850.0, (640.0, 360.0), 0.0, (0.0, 0.0, 70.0));
        let cam1 = synthetic_camera("cam1", 850.0, (640.0, 360.0), 0.6, (6.0, -1.0, 70.0));
        let cam2 = synthetic_camera("cam2", 850.0, (640.0, 360.0), -0.4, (-5.0, 1.0, 65.0));

        let truth = Point3D::new(2.0, -1.5, 3.0, 1.0);
        let markers = reproject(&truth, &[&cam0, &cam1, &cam2]).unwrap();

        let views: Vec<(&crate::DltCamera, Marker2D)> =
            [&cam0, &cam1, &cam2].into_iter().zip(markers).collect();
        let est = triangulate(&views, LikelihoodPolicy::Min).unwrap();
        assert!(est.distance(&truth) < 1e-6);
    }

    #[test]
    fn noise_free_views_keep_error_flat() {
        // Adding a correctly calibrated, noise-free view must not push the
        // reprojection error beyond numerical tolerance.
        let cams: Vec<_> = (0..5)
            .map(|i| {
                synthetic_camera(
                    &format!("cam{i}"),
                    820.0,
                    (640.0, 360.0),
                    0.3 * i as f64 - 0.6,
                    (3.0 * i as f64 - 6.0, 0.5 * i as f64, 68.0),
                )
            })
            .collect();

        let truth = Point3D::new(1.0, 2.0, 3.0, 1.0);
        let views: Vec<(&crate::DltCamera, Marker2D)> = cams
            .iter()
            .map(|c| (c, c.project(&truth).unwrap()))
            .collect();

        let mut previous = 0.0;
        for n in 2..=views.len() {
            let subset = &views[..n];
            let est = triangulate(subset, LikelihoodPolicy::Min).unwrap();
            let err = reprojection_error(&est, subset).unwrap();
            assert!(err < 1e-12, "{n} views: error {err}");
            assert!(err <= previous + 1e-12);
            previous = err;
        }
    }

    #[test]
    fn error_grows_with_displacement() {
        let cam0 = synthetic_camera("cam0", 850.0, (640.0, 360.0), 0.0, (0.0, 0.0, 70.0));
        let cam1 = synthetic_camera("cam1", 850.0, (640.0, 360.0), 0.6, (6.0, -1.0, 70.0));

        let truth = Point3D::new(0.0, 0.0, 1.0, 1.0);
        let mut views: Vec<(&crate::DltCamera, Marker2D)> = vec![
            (&cam0, cam0.project(&truth).unwrap()),
            (&cam1, cam1.project(&truth).unwrap()),
        ];
        assert!(reprojection_error(&truth, &views).unwrap() < 1e-12);

        views[0].1.x += 3.0;
        views[0].1.y += 4.0;
        let err = reprojection_error(&truth, &views).unwrap();
        assert!((err - 25.0).abs() < 1e-9, "expected 25 px^2, got {err}");
    }
}
