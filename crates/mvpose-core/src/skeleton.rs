use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Point3D;

/// A named collection of 3D body parts for one frame.
///
/// Parts missing from the map are treated as `(0, 0, 0)` with likelihood 0,
/// mirroring how unannotated keypoints are stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    parts: BTreeMap<String, Point3D>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// A skeleton with every named part zeroed at likelihood 0.
    pub fn with_parts(names: &[String]) -> Self {
        let parts = names
            .iter()
            .map(|n| (n.clone(), Point3D::new(0.0, 0.0, 0.0, 0.0)))
            .collect();
        Self { parts }
    }

    pub fn part(&self, name: &str) -> Option<&Point3D> {
        self.parts.get(name)
    }

    pub fn set_part(&mut self, name: impl Into<String>, point: Point3D) {
        self.parts.insert(name.into(), point);
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Point3D)> {
        self.parts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn zero() -> Point3D {
    Point3D::new(0.0, 0.0, 0.0, 0.0)
}

fn combine(a: &Skeleton, b: &Skeleton, op: impl Fn(f64, f64) -> f64) -> Skeleton {
    let mut out = Skeleton::new();
    let names: std::collections::BTreeSet<&str> =
        a.part_names().chain(b.part_names()).collect();
    for name in names {
        let pa = a.part(name).copied().unwrap_or_else(zero);
        let pb = b.part(name).copied().unwrap_or_else(zero);
        out.set_part(
            name,
            Point3D::new(
                op(pa.x, pb.x),
                op(pa.y, pb.y),
                op(pa.z, pb.z),
                // Combined per-part confidence is the min of the operands.
                pa.likelihood.min(pb.likelihood),
            ),
        );
    }
    out
}

/// Part-wise sum of two skeletons; each part's likelihood is the minimum of
/// the two operands' likelihoods.
pub fn elementwise_add(a: &Skeleton, b: &Skeleton) -> Skeleton {
    combine(a, b, |x, y| x + y)
}

/// Part-wise difference `a - b`; each part's likelihood is the minimum of
/// the two operands' likelihoods.
pub fn elementwise_sub(a: &Skeleton, b: &Skeleton) -> Skeleton {
    combine(a, b, |x, y| x - y)
}

/// Scale every part's coordinates by a constant; likelihoods are unchanged.
pub fn elementwise_scale(a: &Skeleton, factor: f64) -> Skeleton {
    let mut out = Skeleton::new();
    for (name, p) in a.iter() {
        out.set_part(
            name,
            Point3D::new(p.x * factor, p.y * factor, p.z * factor, p.likelihood),
        );
    }
    out
}
