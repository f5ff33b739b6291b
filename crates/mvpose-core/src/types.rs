use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// A 2D keypoint observation in one camera view.
///
/// The camera identity is carried by pairing the marker with its
/// [`DltCamera`](crate::DltCamera), not stored in the value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker2D {
    pub x: f64,
    pub y: f64,
    /// Detector confidence in `[0, 1]`.
    pub likelihood: f64,
}

impl Marker2D {
    pub fn new(x: f64, y: f64, likelihood: f64) -> Self {
        Self { x, y, likelihood }
    }

    /// Whether this observation is usable at the given confidence threshold.
    #[inline]
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.likelihood >= threshold
    }

    #[inline]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Pixel distance to another marker.
    pub fn distance(&self, other: &Marker2D) -> f64 {
        (self.position() - other.position()).norm()
    }
}

/// A triangulated 3D point with a derived confidence.
///
/// Plain value struct: geometry plus explicit metadata, no numeric-array
/// subtyping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Combined confidence of the contributing observations.
    pub likelihood: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64, likelihood: f64) -> Self {
        Self { x, y, z, likelihood }
    }

    #[inline]
    pub fn coords(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn distance(&self, other: &Point3D) -> f64 {
        (self.coords() - other.coords()).norm()
    }

    pub fn magnitude(&self) -> f64 {
        self.coords().coords.norm()
    }
}

/// Rule for combining per-view likelihoods into one value.
///
/// `Min` is the conservative default: an estimate is only as trustworthy as
/// its weakest contributing view. The alternatives are offered as tunable
/// policies, not because any of them is canonical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodPolicy {
    #[default]
    Min,
    Mean,
    Product,
}

impl LikelihoodPolicy {
    /// Combine likelihoods of contributing views. Empty input yields 0.
    pub fn combine(&self, likelihoods: &[f64]) -> f64 {
        if likelihoods.is_empty() {
            return 0.0;
        }
        match self {
            LikelihoodPolicy::Min => likelihoods.iter().cloned().fold(f64::INFINITY, f64::min),
            LikelihoodPolicy::Mean => {
                likelihoods.iter().sum::<f64>() / likelihoods.len() as f64
            }
            LikelihoodPolicy::Product => likelihoods.iter().product(),
        }
    }
}
