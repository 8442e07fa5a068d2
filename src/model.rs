//! Segment models.
//!
//! [`SegmentModel`] is the only thing the rest of the crate knows about a model: it takes a
//! table of answers and returns the same table with one extra column holding the segment of
//! each row. [`CentroidModel`] is the bundled backend, a pre-trained set of cluster centroids
//! over one-hot encoded answers.

use linfa::traits::PredictInplace;
use log::info;
use ndarray::{Array1, Array2, ArrayView1};
use rmp_serde::{decode::from_read, encode::write_named};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{Result, SegmentError};
use crate::segment::SegmentId;
use crate::table::Table;

/// Column the bundled model writes segment ids into.
pub const DEFAULT_SEGMENT_COLUMN: &str = "Cluster";

/// Inference contract of a trained segmentation model.
pub trait SegmentModel {
    /// Returns `rows` plus a [`segment_column`](Self::segment_column) holding the segment of
    /// each row. Must accept single- and multi-row tables.
    fn predict(&self, rows: &Table) -> Result<Table>;

    fn segment_column(&self) -> &str {
        DEFAULT_SEGMENT_COLUMN
    }
}

impl<M: SegmentModel + ?Sized> SegmentModel for &M {
    fn predict(&self, rows: &Table) -> Result<Table> {
        (**self).predict(rows)
    }

    fn segment_column(&self) -> &str {
        (**self).segment_column()
    }
}

impl<M: SegmentModel + ?Sized> SegmentModel for Box<M> {
    fn predict(&self, rows: &Table) -> Result<Table> {
        (**self).predict(rows)
    }

    fn segment_column(&self) -> &str {
        (**self).segment_column()
    }
}

/// One categorical input column and the vocabulary it was one-hot encoded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub column: String,
    pub categories: Vec<String>,
}

/// Nearest-centroid segment model over one-hot encoded categorical answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidModel {
    features: Vec<FeatureColumn>,
    segments: Vec<SegmentId>,
    centroids: Array2<f64>,
}

impl CentroidModel {
    pub fn new(
        features: Vec<FeatureColumn>,
        segments: Vec<SegmentId>,
        centroids: Array2<f64>,
    ) -> Result<Self> {
        let model = CentroidModel {
            features,
            segments,
            centroids,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.segments.is_empty() {
            return Err(SegmentError::ModelInference(
                "model has no centroids".to_string(),
            ));
        }
        if self.segments.len() != self.centroids.nrows() {
            return Err(SegmentError::ModelInference(format!(
                "model names {} segments but has {} centroids",
                self.segments.len(),
                self.centroids.nrows()
            )));
        }
        if self.encoded_width() != self.centroids.ncols() {
            return Err(SegmentError::ModelInference(format!(
                "centroids have {} coordinates but the features encode to {}",
                self.centroids.ncols(),
                self.encoded_width()
            )));
        }
        Ok(())
    }

    pub fn features(&self) -> &[FeatureColumn] {
        &self.features
    }

    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    fn encoded_width(&self) -> usize {
        self.features.iter().map(|f| f.categories.len()).sum()
    }

    /// One-hot encodes the model's feature columns of `rows`.
    /// Values outside a column's vocabulary encode as all zeros.
    pub fn encode(&self, rows: &Table) -> Result<Array2<f64>> {
        let mut x = Array2::zeros((rows.len(), self.encoded_width()));
        let mut offset = 0;

        for feature in &self.features {
            let cells = rows.column(&feature.column).ok_or_else(|| {
                SegmentError::ModelInference(format!(
                    "input is missing feature column '{}'",
                    feature.column
                ))
            })?;

            for (i, cell) in cells.enumerate() {
                if let Some(j) = feature.categories.iter().position(|c| c == cell) {
                    x[[i, offset + j]] = 1.0;
                }
            }
            offset += feature.categories.len();
        }

        Ok(x)
    }

    fn nearest(&self, point: ArrayView1<f64>) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (idx, centroid) in self.centroids.outer_iter().enumerate() {
            let dist: f64 = centroid
                .iter()
                .zip(point.iter())
                .map(|(c, p)| (c - p) * (c - p))
                .sum();
            // strict comparison keeps the lowest index on ties
            if dist < best_dist {
                best = idx;
                best_dist = dist;
            }
        }
        best
    }

    /// Loads a model from `.json` or MessagePack (any other extension).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let model: CentroidModel = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            from_read(reader)?
        };
        model.validate()?;
        info!(
            "loaded model with {} segments over {} features from {}",
            model.segments.len(),
            model.features.len(),
            path.display()
        );
        Ok(model)
    }

    /// Saves the model as `.json` or MessagePack (any other extension).
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            write_named(&mut writer, self)?;
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl PredictInplace<Array2<f64>, Array1<usize>> for CentroidModel {
    fn predict_inplace(&self, x: &Array2<f64>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "the number of data points must match the number of output targets"
        );
        assert_eq!(
            x.ncols(),
            self.centroids.ncols(),
            "input width must match the centroid width"
        );
        for (point, target) in x.outer_iter().zip(y.iter_mut()) {
            *target = self.nearest(point);
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl SegmentModel for CentroidModel {
    fn predict(&self, rows: &Table) -> Result<Table> {
        let x = self.encode(rows)?;
        let mut nearest = self.default_target(&x);
        self.predict_inplace(&x, &mut nearest);

        let ids = nearest.iter().map(|&idx| self.segments[idx].as_str());
        rows.with_column(self.segment_column(), ids)
    }
}
