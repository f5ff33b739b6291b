use serde::{Deserialize, Serialize};

use mvpose_core::{
    reprojection_error, triangulate, DltCamera, LikelihoodPolicy, Marker2D, Point3D, ReconError,
    MIN_VIEWS,
};

/// Camera-subset selection policy for a single reconstruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionAlgorithm {
    /// Triangulate from exactly the candidate views handed in.
    Fixed,
    /// Search candidate subsets for the lowest mean reprojection error.
    #[default]
    AutoSubset,
}

/// A reconstruction together with the views that produced it.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub point: Point3D,
    /// Indices into the candidate list of the views used for triangulation.
    pub used_views: Vec<usize>,
    /// Mean squared reprojection error over the used views, in px^2.
    pub score: f64,
}

/// Score slack under which a larger subset is preferred over a smaller one.
const TIE_EPS: f64 = 1e-9;

/// Reconstruct a 3D point from above-threshold candidate views.
///
/// `candidates` must already be threshold-filtered; fewer than two of them
/// fail with [`ReconError::InsufficientViews`].
pub fn reconstruct(
    candidates: &[(&DltCamera, Marker2D)],
    algorithm: ReconstructionAlgorithm,
    policy: LikelihoodPolicy,
) -> Result<Reconstruction, ReconError> {
    if candidates.len() < MIN_VIEWS {
        return Err(ReconError::InsufficientViews {
            needed: MIN_VIEWS,
            got: candidates.len(),
        });
    }
    match algorithm {
        ReconstructionAlgorithm::Fixed => {
            let point = triangulate(candidates, policy)?;
            let score = reprojection_error(&point, candidates)? / candidates.len() as f64;
            Ok(Reconstruction {
                point,
                used_views: (0..candidates.len()).collect(),
                score,
            })
        }
        ReconstructionAlgorithm::AutoSubset => auto_subset(candidates, policy),
    }
}

/// Triangulate from `subset` and score it by the mean squared reprojection
/// error over the subset's own views.
///
/// Scoring against the subset rather than against every candidate is what
/// makes the search reject outliers: a least-squares point that absorbs a
/// spurious view always lowers the total error over *all* views, so that
/// total would rank the polluted subset best. The views outside the subset
/// are judged only implicitly, by whether adding them keeps the error flat.
///
/// Degenerate subsets yield `None`: they are skipped during the search, not
/// fatal to it.
fn evaluate(
    subset: &[usize],
    candidates: &[(&DltCamera, Marker2D)],
    policy: LikelihoodPolicy,
) -> Option<(Point3D, f64)> {
    let views: Vec<(&DltCamera, Marker2D)> =
        subset.iter().map(|&i| candidates[i]).collect();
    let point = triangulate(&views, policy).ok()?;
    let score = reprojection_error(&point, &views).ok()? / views.len() as f64;
    Some((point, score))
}

/// Exhaustive pair scan followed by greedy growth.
///
/// All view pairs are evaluated first; the best pair is then grown one view
/// at a time, accepting a view only while the mean error does not get worse
/// (ties go to more views). This is a heuristic, not a guaranteed
/// combinatorial optimum — exact subset search is exponential in the camera
/// count.
fn auto_subset(
    candidates: &[(&DltCamera, Marker2D)],
    policy: LikelihoodPolicy,
) -> Result<Reconstruction, ReconError> {
    let n = candidates.len();

    let mut best: Option<(Vec<usize>, Point3D, f64)> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            let subset = vec![i, j];
            if let Some((point, score)) = evaluate(&subset, candidates, policy) {
                if best.as_ref().is_none_or(|(_, _, s)| score < *s) {
                    best = Some((subset, point, score));
                }
            }
        }
    }

    let (mut subset, mut point, mut score) = best.ok_or_else(|| ReconError::DegenerateGeometry {
        context: format!("no triangulatable view pair among {n} candidates"),
    })?;

    loop {
        let mut grown: Option<(usize, Point3D, f64)> = None;
        for k in 0..n {
            if subset.contains(&k) {
                continue;
            }
            let mut trial = subset.clone();
            trial.push(k);
            if let Some((p, s)) = evaluate(&trial, candidates, policy) {
                if s <= score + TIE_EPS && grown.as_ref().is_none_or(|(_, _, gs)| s < *gs) {
                    grown = Some((k, p, s));
                }
            }
        }
        match grown {
            Some((k, p, s)) => {
                subset.push(k);
                point = p;
                score = s;
            }
            None => break,
        }
    }

    subset.sort_unstable();
    Ok(Reconstruction {
        point,
        used_views: subset,
        score,
    })
}
