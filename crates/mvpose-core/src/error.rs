/// Errors produced by the reconstruction core.
///
/// `InsufficientViews` and `DegenerateGeometry` are recoverable: a batch
/// caller skips the affected keypoint/frame and keeps going.
/// `InvalidCoefficients` is raised once when a camera is built and the
/// camera is excluded from any further use.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    #[error("camera '{camera}' has invalid DLT coefficients: {reason}")]
    InvalidCoefficients { camera: String, reason: String },
    #[error("insufficient views for triangulation (need {needed}, got {got})")]
    InsufficientViews { needed: usize, got: usize },
    #[error("degenerate geometry: {context}")]
    DegenerateGeometry { context: String },
}
