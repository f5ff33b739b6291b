use serde::{Deserialize, Serialize};

use crate::{Marker2D, Point3D, ReconError};

/// Number of coefficients in the DLT calibration model.
pub const DLT_COEFFS: usize = 11;

/// Denominator magnitudes below this are treated as a degenerate projection.
const DENOM_EPS: f64 = 1e-12;

/// A camera calibrated with the 11-parameter direct linear transform.
///
/// The forward model maps a world point `(x, y, z)` to pixel coordinates:
///
/// ```text
/// u = (c1*x + c2*y + c3*z + c4) / (c9*x + c10*y + c11*z + 1)
/// v = (c5*x + c6*y + c7*z + c8) / (c9*x + c10*y + c11*z + 1)
/// ```
///
/// Cameras are immutable once built; the reconstruction core only ever holds
/// shared references to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DltCamera {
    name: String,
    coefficients: [f64; DLT_COEFFS],
    /// Image resolution `(width, height)`, when known.
    resolution: Option<(u32, u32)>,
}

impl DltCamera {
    /// Build a camera from a DLT coefficient vector.
    ///
    /// Fails with [`ReconError::InvalidCoefficients`] if the vector does not
    /// contain exactly 11 finite values.
    pub fn new(
        name: impl Into<String>,
        coefficients: &[f64],
        resolution: Option<(u32, u32)>,
    ) -> Result<Self, ReconError> {
        let name = name.into();
        let coefficients: [f64; DLT_COEFFS] =
            coefficients
                .try_into()
                .map_err(|_| ReconError::InvalidCoefficients {
                    camera: name.clone(),
                    reason: format!("expected {DLT_COEFFS} values, got {}", coefficients.len()),
                })?;
        if let Some(idx) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ReconError::InvalidCoefficients {
                camera: name,
                reason: format!("coefficient {} is not finite", idx + 1),
            });
        }
        Ok(Self {
            name,
            coefficients,
            resolution,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn coefficients(&self) -> &[f64; DLT_COEFFS] {
        &self.coefficients
    }

    #[inline]
    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }

    /// Project a 3D point into this camera's image plane.
    ///
    /// The returned marker carries the point's likelihood; callers that
    /// write reprojections back to a store override it with their own
    /// confidence. Fails with [`ReconError::DegenerateGeometry`] when the
    /// projective denominator vanishes at the queried point.
    pub fn project(&self, point: &Point3D) -> Result<Marker2D, ReconError> {
        let c = &self.coefficients;
        let denom = c[8] * point.x + c[9] * point.y + c[10] * point.z + 1.0;
        if denom.abs() < DENOM_EPS {
            return Err(ReconError::DegenerateGeometry {
                context: format!(
                    "camera '{}' projects ({:.3}, {:.3}, {:.3}) to infinity",
                    self.name, point.x, point.y, point.z
                ),
            });
        }
        let u = (c[0] * point.x + c[1] * point.y + c[2] * point.z + c[3]) / denom;
        let v = (c[4] * point.x + c[5] * point.y + c[6] * point.z + c[7]) / denom;
        Ok(Marker2D::new(u, v, point.likelihood))
    }
}
