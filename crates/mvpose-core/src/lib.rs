//! Core geometry for multi-view DLT pose reconstruction.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about file formats, video frames or configuration; it operates on
//! calibrated cameras, 2D markers and 3D points.

mod camera;
mod error;
mod logger;
mod reproject;
mod skeleton;
#[cfg(test)]
mod test_cams;
mod triangulate;
mod types;

pub use camera::{DltCamera, DLT_COEFFS};
pub use error::ReconError;
pub use reproject::{reproject, reprojection_error};
pub use skeleton::{elementwise_add, elementwise_scale, elementwise_sub, Skeleton};
pub use triangulate::{triangulate, MIN_VIEWS};
pub use types::{LikelihoodPolicy, Marker2D, Point3D};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
