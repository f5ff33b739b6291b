//! Per-frame keypoint stores.
//!
//! The canonical on-disk format is the DeepLabCut CSV flavor: three header
//! rows (scorer / bodyparts / coords), one data row per frame, and an
//! `x, y, likelihood` column triple per body part. A parallel store holds
//! triangulated 3D output with an `x, y, z, likelihood` quadruple per part.

use std::path::Path;

use mvpose_core::{Marker2D, Point3D, Skeleton};

/// Errors raised by the CSV-backed stores.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("malformed store at row {row}: {reason}")]
    Malformed { row: usize, reason: String },
    #[error("unknown body part '{part}'")]
    UnknownPart { part: String },
}

/// Read/write access to per-frame 2D keypoints of one camera view.
pub trait MarkerStore {
    fn part_names(&self) -> &[String];

    fn frame_count(&self) -> usize;

    /// The marker for a part at a frame, `None` for unknown parts.
    fn marker(&self, frame: usize, part: &str) -> Option<Marker2D>;

    /// Overwrite the marker for a part at a frame, growing the store with
    /// invisible markers if the frame is past the current end.
    fn set_marker(&mut self, frame: usize, part: &str, marker: Marker2D)
        -> Result<(), StoreError>;

    /// All parts of one frame as a skeleton with `z = 0`.
    fn skeleton(&self, frame: usize) -> Skeleton {
        let mut sk = Skeleton::new();
        for name in self.part_names().to_vec() {
            if let Some(m) = self.marker(frame, &name) {
                sk.set_part(name, Point3D::new(m.x, m.y, 0.0, m.likelihood));
            }
        }
        sk
    }

    /// Write every part of a skeleton into one frame, dropping `z`.
    ///
    /// Fails with [`StoreError::UnknownPart`] on the first part the store
    /// does not track.
    fn set_skeleton(&mut self, frame: usize, skeleton: &Skeleton) -> Result<(), StoreError> {
        for (name, p) in skeleton.iter() {
            self.set_marker(frame, name, Marker2D::new(p.x, p.y, p.likelihood))?;
        }
        Ok(())
    }
}

const COORDS_2D: [&str; 3] = ["x", "y", "likelihood"];
const COORDS_3D: [&str; 4] = ["x", "y", "z", "likelihood"];

/// DeepLabCut-flavor CSV store of 2D keypoints for one camera view.
#[derive(Clone, Debug)]
pub struct CsvMarkerStore {
    scorer: String,
    parts: Vec<String>,
    rows: Vec<Vec<Marker2D>>,
}

impl CsvMarkerStore {
    /// An empty in-memory store with `frames` rows of invisible markers.
    pub fn new(scorer: impl Into<String>, parts: Vec<String>, frames: usize) -> Self {
        let blank = vec![Marker2D::new(0.0, 0.0, 0.0); parts.len()];
        Self {
            scorer: scorer.into(),
            parts,
            rows: vec![blank; frames],
        }
    }

    pub fn scorer(&self) -> &str {
        &self.scorer
    }

    /// Load a store from a DeepLabCut CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()?;
        if records.len() < 3 {
            return Err(StoreError::Malformed {
                row: records.len(),
                reason: "expected scorer, bodyparts and coords header rows".into(),
            });
        }

        let scorer = records[0].get(1).unwrap_or_default().to_string();

        let width = records[2].len();
        if width < 1 + COORDS_2D.len() || (width - 1) % COORDS_2D.len() != 0 {
            return Err(StoreError::Malformed {
                row: 2,
                reason: format!("unexpected column count {width}"),
            });
        }
        let n_parts = (width - 1) / COORDS_2D.len();

        let mut parts = Vec::with_capacity(n_parts);
        for p in 0..n_parts {
            let col = 1 + p * COORDS_2D.len();
            let name = records[1].get(col).ok_or_else(|| StoreError::Malformed {
                row: 1,
                reason: format!("missing body part name in column {col}"),
            })?;
            for (k, coord) in COORDS_2D.iter().enumerate() {
                let got = records[2].get(col + k).unwrap_or_default();
                if got != *coord {
                    return Err(StoreError::Malformed {
                        row: 2,
                        reason: format!("expected '{coord}' in column {}, got '{got}'", col + k),
                    });
                }
            }
            parts.push(name.to_string());
        }

        let mut rows = Vec::with_capacity(records.len() - 3);
        for (row_idx, record) in records.iter().enumerate().skip(3) {
            let mut markers = Vec::with_capacity(n_parts);
            for p in 0..n_parts {
                let col = 1 + p * COORDS_2D.len();
                let cell = |k: usize| -> Result<f64, StoreError> {
                    let raw = record.get(col + k).unwrap_or_default();
                    if raw.is_empty() {
                        return Ok(0.0);
                    }
                    raw.parse().map_err(|_| StoreError::Malformed {
                        row: row_idx,
                        reason: format!("'{raw}' is not a number (column {})", col + k),
                    })
                };
                markers.push(Marker2D::new(cell(0)?, cell(1)?, cell(2)?));
            }
            rows.push(markers);
        }

        Ok(Self { scorer, parts, rows })
    }

    /// Write the store back to disk in the DeepLabCut CSV flavor.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let mut scorer_row = vec!["scorer".to_string()];
        let mut parts_row = vec!["bodyparts".to_string()];
        let mut coords_row = vec!["coords".to_string()];
        for part in &self.parts {
            for coord in COORDS_2D {
                scorer_row.push(self.scorer.clone());
                parts_row.push(part.clone());
                coords_row.push(coord.to_string());
            }
        }
        writer.write_record(&scorer_row)?;
        writer.write_record(&parts_row)?;
        writer.write_record(&coords_row)?;

        for (frame, markers) in self.rows.iter().enumerate() {
            let mut row = vec![frame.to_string()];
            for m in markers {
                row.push(m.x.to_string());
                row.push(m.y.to_string());
                row.push(m.likelihood.to_string());
            }
            writer.write_record(&row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn part_index(&self, part: &str) -> Option<usize> {
        self.parts.iter().position(|p| p == part)
    }

    fn grow_to(&mut self, frame: usize) {
        let blank = vec![Marker2D::new(0.0, 0.0, 0.0); self.parts.len()];
        while self.rows.len() <= frame {
            self.rows.push(blank.clone());
        }
    }
}

impl MarkerStore for CsvMarkerStore {
    fn part_names(&self) -> &[String] {
        &self.parts
    }

    fn frame_count(&self) -> usize {
        self.rows.len()
    }

    fn marker(&self, frame: usize, part: &str) -> Option<Marker2D> {
        let idx = self.part_index(part)?;
        self.rows.get(frame).map(|row| row[idx])
    }

    fn set_marker(
        &mut self,
        frame: usize,
        part: &str,
        marker: Marker2D,
    ) -> Result<(), StoreError> {
        let idx = self
            .part_index(part)
            .ok_or_else(|| StoreError::UnknownPart { part: part.into() })?;
        self.grow_to(frame);
        self.rows[frame][idx] = marker;
        Ok(())
    }
}

/// CSV store of triangulated 3D points, one row per frame.
#[derive(Clone, Debug)]
pub struct CsvPoint3dStore {
    parts: Vec<String>,
    rows: Vec<Vec<Point3D>>,
}

impl CsvPoint3dStore {
    pub fn new(parts: Vec<String>) -> Self {
        Self {
            parts,
            rows: Vec::new(),
        }
    }

    pub fn part_names(&self) -> &[String] {
        &self.parts
    }

    pub fn frame_count(&self) -> usize {
        self.rows.len()
    }

    pub fn point(&self, frame: usize, part: &str) -> Option<Point3D> {
        let idx = self.parts.iter().position(|p| p == part)?;
        self.rows.get(frame).map(|row| row[idx])
    }

    /// Overwrite one part's 3D point, growing the store with invisible
    /// points if the frame is past the current end.
    pub fn set_point(
        &mut self,
        frame: usize,
        part: &str,
        point: Point3D,
    ) -> Result<(), StoreError> {
        let idx = self
            .parts
            .iter()
            .position(|p| p == part)
            .ok_or_else(|| StoreError::UnknownPart { part: part.into() })?;
        let blank = vec![Point3D::new(0.0, 0.0, 0.0, 0.0); self.parts.len()];
        while self.rows.len() <= frame {
            self.rows.push(blank.clone());
        }
        self.rows[frame][idx] = point;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let mut parts_row = vec!["bodyparts".to_string()];
        let mut coords_row = vec!["coords".to_string()];
        for part in &self.parts {
            for coord in COORDS_3D {
                parts_row.push(part.clone());
                coords_row.push(coord.to_string());
            }
        }
        writer.write_record(&parts_row)?;
        writer.write_record(&coords_row)?;

        for (frame, points) in self.rows.iter().enumerate() {
            let mut row = vec![frame.to_string()];
            for p in points {
                row.push(p.x.to_string());
                row.push(p.y.to_string());
                row.push(p.z.to_string());
                row.push(p.likelihood.to_string());
            }
            writer.write_record(&row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
