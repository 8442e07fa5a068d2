use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Result, SegmentError};
use crate::population::LabeledPopulation;
use crate::segment::SegmentId;

/// Human-readable metadata for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub name: String,
    pub description: String,
}

/// Names and descriptions of every segment the model can produce.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentCatalog {
    entries: BTreeMap<SegmentId, SegmentInfo>,
}

impl SegmentCatalog {
    pub fn new(entries: BTreeMap<SegmentId, SegmentInfo>) -> Self {
        SegmentCatalog { entries }
    }

    /// Loads a JSON object keyed by segment id: `{"Cluster 0": {"name": .., "description": ..}}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let catalog: SegmentCatalog = serde_json::from_reader(reader)?;
        info!(
            "loaded {} segment descriptions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up a segment. An unknown id is an error, never a default entry.
    pub fn get(&self, id: &SegmentId) -> Result<&SegmentInfo> {
        self.entries
            .get(id)
            .ok_or_else(|| SegmentError::MissingCatalogEntry(id.clone()))
    }

    /// Fails on the first segment of `population` without a catalog entry.
    pub fn ensure_covers(&self, population: &LabeledPopulation) -> Result<()> {
        for id in population.segment_ids() {
            self.get(id)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SegmentId, &SegmentInfo)> {
        self.entries.iter()
    }
}
