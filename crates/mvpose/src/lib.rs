//! Multi-view DLT pose reconstruction.
//!
//! This crate provides:
//! - stable re-exports of the geometric core (`mvpose-core`)
//! - camera-subset reconstruction strategies (`fixed`, `auto_subset`)
//! - a per-frame batch pipeline that reads 2D keypoints from one store per
//!   camera view, triangulates each body part and writes both the 3D result
//!   and geometrically consistent 2D corrections back
//! - DeepLabCut-flavor CSV keypoint stores and a JSON project config
//!
//! ## Quickstart
//!
//! ```no_run
//! use mvpose::{
//!     CsvMarkerStore, CsvPoint3dStore, MarkerStore, ProjectConfig, ReconstructionPipeline,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProjectConfig::load_json("project.json")?;
//! let (cameras, _rejected) = config.build_cameras();
//!
//! let mut stores: Vec<CsvMarkerStore> = config
//!     .views
//!     .values()
//!     .filter_map(|v| v.annotation_file.as_deref())
//!     .map(CsvMarkerStore::from_path)
//!     .collect::<Result<_, _>>()?;
//! let frames = stores.iter().map(|s| s.frame_count()).min().unwrap_or(0);
//! let mut output = CsvPoint3dStore::new(config.body_parts.clone());
//!
//! let pipeline = ReconstructionPipeline::new(
//!     cameras,
//!     config.threshold,
//!     config.algorithm,
//!     config.likelihood_policy,
//! );
//! let report = pipeline.run(0..frames, &config.body_parts, &mut stores, Some(&mut output))?;
//! println!("reconstructed {} keypoints", report.reconstructed);
//! # Ok(())
//! # }
//! ```

pub use mvpose_core as core;

pub use mvpose_core::{
    elementwise_add, elementwise_scale, elementwise_sub, reproject, reprojection_error,
    triangulate, DltCamera, LikelihoodPolicy, Marker2D, Point3D, ReconError, Skeleton,
    DLT_COEFFS, MIN_VIEWS,
};

mod config;
mod pipeline;
mod store;
mod strategy;
#[cfg(test)]
mod test_cams;

pub use config::{ConfigError, ProjectConfig, ViewConfig};
pub use pipeline::{PipelineError, ReconstructionPipeline, ReconstructionReport};
pub use store::{CsvMarkerStore, CsvPoint3dStore, MarkerStore, StoreError};
pub use strategy::{reconstruct, Reconstruction, ReconstructionAlgorithm};
