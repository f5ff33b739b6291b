//! JSON project configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ReconstructionAlgorithm;
use mvpose_core::{DltCamera, LikelihoodPolicy, ReconError};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_threshold() -> f64 {
    0.6
}

/// One camera view: calibration plus the location of its keypoint file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewConfig {
    /// 11-parameter DLT coefficient vector, precomputed by an external
    /// calibration tool.
    pub dlt_coefficients: Vec<f64>,
    /// Image resolution `(width, height)`.
    #[serde(default)]
    pub resolution: Option<(u32, u32)>,
    /// Path of the view's 2D keypoint CSV, relative to the config file.
    #[serde(default)]
    pub annotation_file: Option<String>,
}

/// Project-level reconstruction configuration.
///
/// Views are keyed by name in a sorted map, so camera order is stable across
/// runs regardless of the JSON field order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_name: String,
    /// Confidence threshold below which an observation is unusable.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Camera-subset selection policy.
    #[serde(default)]
    pub algorithm: ReconstructionAlgorithm,
    /// Multi-view likelihood combination rule.
    #[serde(default)]
    pub likelihood_policy: LikelihoodPolicy,
    pub body_parts: Vec<String>,
    pub views: BTreeMap<String, ViewConfig>,
}

impl ProjectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Build calibrated cameras for every view, in view-name order.
    ///
    /// Views with malformed coefficient vectors are logged, collected into
    /// the returned error list and excluded; they never enter a subset
    /// search. This is the single place where `InvalidCoefficients` is
    /// reported.
    pub fn build_cameras(&self) -> (Vec<DltCamera>, Vec<ReconError>) {
        let mut cameras = Vec::with_capacity(self.views.len());
        let mut rejected = Vec::new();
        for (name, view) in &self.views {
            match DltCamera::new(name.clone(), &view.dlt_coefficients, view.resolution) {
                Ok(cam) => cameras.push(cam),
                Err(err) => {
                    log::warn!("excluding camera: {err}");
                    rejected.push(err);
                }
            }
        }
        (cameras, rejected)
    }

    /// View names in the same order as [`ProjectConfig::build_cameras`]
    /// output, including invalid views.
    pub fn view_names(&self) -> Vec<&str> {
        self.views.keys().map(String::as_str).collect()
    }
}
