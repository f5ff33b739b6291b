//! Per-frame reconstruction orchestration.

use std::ops::Range;

use mvpose_core::{reproject, DltCamera, LikelihoodPolicy, Marker2D, ReconError};

use crate::store::{CsvPoint3dStore, MarkerStore, StoreError};
use crate::strategy::{reconstruct, ReconstructionAlgorithm};

/// Fatal pipeline failures. Per-keypoint geometry errors are not here —
/// those are tallied in [`ReconstructionReport`] and processing continues.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("store count ({stores}) does not match camera count ({cameras})")]
    StoreCameraMismatch { stores: usize, cameras: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregated outcome of a batch run.
///
/// Skips are counted, not propagated: one bad frame must never abort a
/// multi-thousand-frame batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconstructionReport {
    /// Keypoints successfully triangulated and written back.
    pub reconstructed: usize,
    /// Keypoints skipped for lack of usable views.
    pub insufficient_views: usize,
    /// Keypoints skipped due to singular or degenerate geometry.
    pub degenerate: usize,
}

impl ReconstructionReport {
    pub fn merge(&mut self, other: &ReconstructionReport) {
        self.reconstructed += other.reconstructed;
        self.insufficient_views += other.insufficient_views;
        self.degenerate += other.degenerate;
    }

    pub fn skipped(&self) -> usize {
        self.insufficient_views + self.degenerate
    }
}

/// Orchestrates per-frame reconstruction across camera views.
///
/// Reads 2D observations from one store per camera, reconstructs each body
/// part, writes the 3D point to an optional output store and overwrites
/// every view's 2D marker with the reprojection at the configured threshold
/// likelihood (marking it "reconstructed" rather than "observed").
pub struct ReconstructionPipeline {
    cameras: Vec<DltCamera>,
    threshold: f64,
    algorithm: ReconstructionAlgorithm,
    policy: LikelihoodPolicy,
}

impl ReconstructionPipeline {
    pub fn new(
        cameras: Vec<DltCamera>,
        threshold: f64,
        algorithm: ReconstructionAlgorithm,
        policy: LikelihoodPolicy,
    ) -> Self {
        if cameras.len() < 2 {
            log::warn!(
                "pipeline built with {} camera(s); every keypoint will be skipped",
                cameras.len()
            );
        }
        Self {
            cameras,
            threshold,
            algorithm,
            policy,
        }
    }

    pub fn cameras(&self) -> &[DltCamera] {
        &self.cameras
    }

    /// Reconstruct every named part at one frame.
    ///
    /// `stores[i]` must be the keypoint store of `cameras[i]`.
    pub fn process_frame<S: MarkerStore>(
        &self,
        frame: usize,
        parts: &[String],
        stores: &mut [S],
        mut output: Option<&mut CsvPoint3dStore>,
    ) -> Result<ReconstructionReport, PipelineError> {
        if stores.len() != self.cameras.len() {
            return Err(PipelineError::StoreCameraMismatch {
                stores: stores.len(),
                cameras: self.cameras.len(),
            });
        }

        let mut report = ReconstructionReport::default();
        let all_cameras: Vec<&DltCamera> = self.cameras.iter().collect();

        for part in parts {
            let candidates: Vec<(&DltCamera, Marker2D)> = stores
                .iter()
                .enumerate()
                .filter_map(|(i, store)| {
                    store
                        .marker(frame, part)
                        .filter(|m| m.is_visible(self.threshold))
                        .map(|m| (&self.cameras[i], m))
                })
                .collect();

            let rec = match reconstruct(&candidates, self.algorithm, self.policy) {
                Ok(rec) => rec,
                Err(ReconError::InsufficientViews { got, .. }) => {
                    log::debug!(
                        "frame {frame}, part '{part}': skipped, {got} usable view(s)"
                    );
                    report.insufficient_views += 1;
                    continue;
                }
                Err(err) => {
                    log::debug!("frame {frame}, part '{part}': skipped, {err}");
                    report.degenerate += 1;
                    continue;
                }
            };

            // Reproject into every view before touching any store, so a
            // degenerate projection leaves the original data intact.
            let corrected = match reproject(&rec.point, &all_cameras) {
                Ok(markers) => markers,
                Err(err) => {
                    log::debug!("frame {frame}, part '{part}': skipped, {err}");
                    report.degenerate += 1;
                    continue;
                }
            };

            for (store, mut marker) in stores.iter_mut().zip(corrected) {
                marker.likelihood = self.threshold;
                store.set_marker(frame, part, marker)?;
            }
            if let Some(out) = output.as_deref_mut() {
                out.set_point(frame, part, rec.point)?;
            }
            report.reconstructed += 1;
        }

        Ok(report)
    }

    /// Reconstruct every part over a frame range, aggregating skips.
    pub fn run<S: MarkerStore>(
        &self,
        frames: Range<usize>,
        parts: &[String],
        stores: &mut [S],
        mut output: Option<&mut CsvPoint3dStore>,
    ) -> Result<ReconstructionReport, PipelineError> {
        let mut report = ReconstructionReport::default();
        for frame in frames {
            let frame_report =
                self.process_frame(frame, parts, stores, output.as_deref_mut())?;
            report.merge(&frame_report);
        }
        log::info!(
            "reconstructed {} keypoint(s), skipped {} ({} insufficient views, {} degenerate)",
            report.reconstructed,
            report.skipped(),
            report.insufficient_views,
            report.degenerate
        );
        Ok(report)
    }
}
