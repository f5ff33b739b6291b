//! Shared synthetic camera rig for unit tests.

use mvpose_core::{DltCamera, DLT_COEFFS};

/// DLT coefficients of a synthetic pinhole camera built from a projection
/// matrix `P = K [R | t]`, normalized so `P(3,4) = 1`. The rotation is a yaw
/// about the world Y axis; `translation.2` must be non-zero.
pub(crate) fn synthetic_camera(
    name: &str,
    focal: f64,
    center: (f64, f64),
    yaw: f64,
    translation: (f64, f64, f64),
) -> DltCamera {
    let (cy, sy) = (yaw.cos(), yaw.sin());
    let r = [[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]];
    let t = [translation.0, translation.1, translation.2];

    let mut p = [[0.0; 4]; 3];
    for col in 0..3 {
        p[0][col] = focal * r[0][col] + center.0 * r[2][col];
        p[1][col] = focal * r[1][col] + center.1 * r[2][col];
        p[2][col] = r[2][col];
    }
    p[0][3] = focal * t[0] + center.0 * t[2];
    p[1][3] = focal * t[1] + center.1 * t[2];
    p[2][3] = t[2];

    let scale = p[2][3];
    assert!(scale.abs() > 1e-9, "camera must not sit on the world origin plane");

    let mut coeffs = [0.0; DLT_COEFFS];
    for col in 0..4 {
        coeffs[col] = p[0][col] / scale;
        coeffs[4 + col] = p[1][col] / scale;
    }
    for col in 0..3 {
        coeffs[8 + col] = p[2][col] / scale;
    }

    DltCamera::new(name, &coeffs, Some((1280, 720))).unwrap()
}
