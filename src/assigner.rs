use log::{debug, info, warn};
use rmp_serde::{decode::from_read, encode::write_named};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::error::{Result, SegmentError};
use crate::model::SegmentModel;
use crate::population::{LabeledPopulation, LabeledRow, ReferencePopulation, RespondentRecord};
use crate::segment::SegmentId;
use crate::table::Table;

/// Runs a [`SegmentModel`] over respondents and the reference population.
#[derive(Debug, Clone)]
pub struct SegmentAssigner<M> {
    model: M,
}

/// Labels persisted next to the data so a restart can skip relabeling.
#[derive(Debug, Serialize, Deserialize)]
struct LabelCache {
    labels: Vec<SegmentId>,
}

impl<M: SegmentModel> SegmentAssigner<M> {
    pub fn new(model: M) -> Self {
        SegmentAssigner { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the segment the model picks for a single respondent.
    pub fn assign_one(&self, record: &RespondentRecord) -> Result<SegmentId> {
        let labels = self.predict_labels(&record.to_table())?;
        match labels.as_slice() {
            [id] => Ok(id.clone()),
            other => Err(SegmentError::ModelInference(format!(
                "expected one label for one respondent, got {}",
                other.len()
            ))),
        }
    }

    /// Labels every reference row in a single model call.
    pub fn label_population(&self, population: &ReferencePopulation) -> Result<LabeledPopulation> {
        let labels = self.predict_labels(&population.to_table())?;
        attach(population, labels)
    }

    /// Reuses labels stored at `cache_path` if the cache is newer than every file in `sources`
    /// (typically the model and the data file); otherwise labels the population and rewrites
    /// the cache.
    pub fn load_or_label_if_stale(
        &self,
        population: &ReferencePopulation,
        cache_path: &Path,
        sources: &[&Path],
    ) -> Result<LabeledPopulation> {
        let cache_mtime = modified(cache_path);
        let newest_source = sources
            .iter()
            .map(|p| modified(p))
            .max()
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if cache_path.exists() && cache_mtime > newest_source {
            debug!("label cache {} is up to date", cache_path.display());
            match read_cache(cache_path) {
                Ok(cache) if cache.labels.len() == population.len() => {
                    info!(
                        "loaded {} segment labels from {}",
                        cache.labels.len(),
                        cache_path.display()
                    );
                    return attach(population, cache.labels);
                }
                Ok(cache) => warn!(
                    "ignoring label cache {}: {} labels for {} rows",
                    cache_path.display(),
                    cache.labels.len(),
                    population.len()
                ),
                Err(e) => warn!("ignoring unreadable label cache {}: {e}", cache_path.display()),
            }
        }

        info!("labeling {} reference respondents", population.len());
        let labeled = self.label_population(population)?;

        let cache = LabelCache {
            labels: labeled.rows().iter().map(|r| r.segment_id.clone()).collect(),
        };
        match write_cache(cache_path, &cache) {
            Ok(()) => debug!("wrote label cache to {}", cache_path.display()),
            Err(e) => warn!("could not write label cache {}: {e}", cache_path.display()),
        }

        Ok(labeled)
    }

    fn predict_labels(&self, rows: &Table) -> Result<Vec<SegmentId>> {
        let out = self.model.predict(rows)?;
        if out.len() != rows.len() {
            return Err(SegmentError::ModelInference(format!(
                "model returned {} rows for {} inputs",
                out.len(),
                rows.len()
            )));
        }

        let column = self.model.segment_column();
        let labels = out.column(column).ok_or_else(|| {
            SegmentError::ModelInference(format!("model output has no '{column}' column"))
        })?;
        Ok(labels.map(SegmentId::new).collect())
    }
}

fn attach(population: &ReferencePopulation, labels: Vec<SegmentId>) -> Result<LabeledPopulation> {
    if labels.len() != population.len() {
        return Err(SegmentError::ModelInference(format!(
            "{} labels for {} reference rows",
            labels.len(),
            population.len()
        )));
    }
    let rows = population
        .rows()
        .iter()
        .zip(labels)
        .map(|(row, segment_id)| LabeledRow {
            row: *row,
            segment_id,
        })
        .collect();
    Ok(LabeledPopulation::new(rows))
}

fn read_cache(path: &Path) -> Result<LabelCache> {
    Ok(from_read(BufReader::new(File::open(path)?))?)
}

fn write_cache(path: &Path, cache: &LabelCache) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_named(&mut writer, cache)?;
    writer.flush()?;
    Ok(())
}

fn modified(path: &Path) -> SystemTime {
    path.metadata()
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Age, EduLevel, FavAnimals, FavPlace, Field, Gender};
    use crate::population::SurveyRow;
    use std::cell::Cell;

    /// Puts women in "F" and everyone else in "M"; counts calls.
    struct GenderModel {
        calls: Cell<usize>,
    }

    impl SegmentModel for GenderModel {
        fn predict(&self, rows: &Table) -> Result<Table> {
            self.calls.set(self.calls.get() + 1);
            let genders: Vec<&str> = rows
                .column("gender")
                .ok_or_else(|| SegmentError::ModelInference("no gender".into()))?
                .map(|g| if g == "Kobieta" { "F" } else { "M" })
                .collect();
            rows.with_column("Cluster", genders)
        }
    }

    struct BrokenModel;

    impl SegmentModel for BrokenModel {
        fn predict(&self, rows: &Table) -> Result<Table> {
            Ok(rows.clone())
        }
    }

    fn record(gender: Gender) -> RespondentRecord {
        RespondentRecord {
            age: Age::From25To34,
            edu_level: EduLevel::Higher,
            fav_animals: FavAnimals::Dogs,
            fav_place: FavPlace::InTheForest,
            gender,
        }
    }

    fn population() -> ReferencePopulation {
        ReferencePopulation::new(vec![
            record(Gender::Female).into(),
            record(Gender::Male).into(),
            SurveyRow::default(),
        ])
    }

    #[test]
    fn assign_one_is_deterministic() {
        let assigner = SegmentAssigner::new(GenderModel { calls: Cell::new(0) });
        let first = assigner.assign_one(&record(Gender::Female)).unwrap();
        let second = assigner.assign_one(&record(Gender::Female)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "F");
    }

    #[test]
    fn label_population_keeps_row_order_and_count() {
        let assigner = SegmentAssigner::new(GenderModel { calls: Cell::new(0) });
        let labeled = assigner.label_population(&population()).unwrap();

        assert_eq!(labeled.len(), 3);
        let ids: Vec<&str> = labeled.rows().iter().map(|r| r.segment_id.as_str()).collect();
        assert_eq!(ids, ["F", "M", "M"]);
        assert_eq!(labeled.rows()[0].row.value(Field::Gender), Some("Kobieta"));
        assert_eq!(assigner.model().calls.get(), 1);
    }

    #[test]
    fn missing_segment_column_propagates() {
        let assigner = SegmentAssigner::new(BrokenModel);
        assert!(matches!(
            assigner.assign_one(&record(Gender::Male)),
            Err(SegmentError::ModelInference(_))
        ));
        assert!(assigner.label_population(&population()).is_err());
    }

    #[test]
    fn label_cache_is_reused_until_a_source_changes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("labels.msgpack");
        let source = dir.path().join("data.csv");
        std::fs::write(&source, "placeholder").unwrap();
        // make sure the cache written below is strictly newer than the source
        std::thread::sleep(std::time::Duration::from_millis(20));

        let assigner = SegmentAssigner::new(GenderModel { calls: Cell::new(0) });
        let pop = population();

        let first = assigner
            .load_or_label_if_stale(&pop, &cache, &[source.as_path()])
            .unwrap();
        assert!(cache.exists());
        assert_eq!(assigner.model().calls.get(), 1);

        let second = assigner
            .load_or_label_if_stale(&pop, &cache, &[source.as_path()])
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(assigner.model().calls.get(), 1);
    }

    /// Returns one row fewer than it was given.
    struct DroppingModel;

    impl SegmentModel for DroppingModel {
        fn predict(&self, rows: &Table) -> Result<Table> {
            let mut out = Table::new(["Cluster"]);
            for _ in 1..rows.len() {
                out.push_row(["0"])?;
            }
            Ok(out)
        }
    }

    #[test]
    fn row_count_mismatch_is_an_inference_failure() {
        let assigner = SegmentAssigner::new(DroppingModel);
        assert!(matches!(
            assigner.label_population(&population()),
            Err(SegmentError::ModelInference(_))
        ));
        assert!(matches!(
            assigner.assign_one(&record(Gender::Female)),
            Err(SegmentError::ModelInference(_))
        ));
    }

    #[test]
    fn corrupt_cache_falls_back_to_labeling() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("labels.msgpack");
        std::fs::write(&cache, b"garbage").unwrap();

        let assigner = SegmentAssigner::new(GenderModel { calls: Cell::new(0) });
        let labeled = assigner.load_or_label_if_stale(&population(), &cache, &[]).unwrap();

        assert_eq!(labeled, assigner.label_population(&population()).unwrap());
        assert_eq!(assigner.model().calls.get(), 2);

        // the bad cache was replaced by a readable one
        let reloaded = assigner.load_or_label_if_stale(&population(), &cache, &[]).unwrap();
        assert_eq!(reloaded, labeled);
        assert_eq!(assigner.model().calls.get(), 2);
    }

    #[test]
    fn unwritable_cache_path_still_returns_labels() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("missing_dir").join("labels.msgpack");

        let assigner = SegmentAssigner::new(GenderModel { calls: Cell::new(0) });
        let labeled = assigner.load_or_label_if_stale(&population(), &cache, &[]).unwrap();

        assert_eq!(labeled.len(), 3);
        assert!(!cache.exists());
    }

    #[test]
    fn cache_for_a_different_population_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("labels.msgpack");
        let assigner = SegmentAssigner::new(GenderModel { calls: Cell::new(0) });

        let small = ReferencePopulation::new(vec![record(Gender::Female).into()]);
        assigner.load_or_label_if_stale(&small, &cache, &[]).unwrap();

        let labeled = assigner.load_or_label_if_stale(&population(), &cache, &[]).unwrap();
        assert_eq!(labeled.len(), 3);
        assert_eq!(assigner.model().calls.get(), 2);
    }
}
