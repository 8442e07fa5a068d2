use log::{debug, info};
use std::sync::Arc;

use crate::assigner::SegmentAssigner;
use crate::catalog::SegmentCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::input::Selections;
use crate::model::{CentroidModel, SegmentModel};
use crate::population::{LabeledPopulation, ReferencePopulation, RespondentRecord};
use crate::report::{SegmentReport, filter_to_segment};

/// Shown instead of a report until every question is answered.
pub const WAITING_PROMPT: &str =
    "⏳ Wybierz wszystkie opcje w panelu bocznym, aby zobaczyć wyniki.";

/// Result of evaluating the current answers.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Some answers are missing; nothing was computed.
    Waiting,
    Report(SegmentReport),
}

/// Matches respondents to segments and describes the segment.
///
/// Built once per process: construction loads nothing itself but labels the reference
/// population exactly once and checks it against the catalog. After that every call is a
/// read-only computation, so a finder can be shared freely.
#[derive(Debug)]
pub struct SegmentFinder<M> {
    assigner: SegmentAssigner<M>,
    catalog: SegmentCatalog,
    population: Arc<LabeledPopulation>,
}

impl<M: SegmentModel> SegmentFinder<M> {
    pub fn new(model: M, catalog: SegmentCatalog, population: &ReferencePopulation) -> Result<Self> {
        let assigner = SegmentAssigner::new(model);
        info!("labeling {} reference respondents", population.len());
        let labeled = assigner.label_population(population)?;
        Self::with_assigner(assigner, catalog, labeled)
    }

    /// Uses a population that was already labeled by this model.
    pub fn from_labeled(
        model: M,
        catalog: SegmentCatalog,
        population: LabeledPopulation,
    ) -> Result<Self> {
        Self::with_assigner(SegmentAssigner::new(model), catalog, population)
    }

    fn with_assigner(
        assigner: SegmentAssigner<M>,
        catalog: SegmentCatalog,
        population: LabeledPopulation,
    ) -> Result<Self> {
        catalog.ensure_covers(&population)?;
        Ok(SegmentFinder {
            assigner,
            catalog,
            population: Arc::new(population),
        })
    }

    pub fn catalog(&self) -> &SegmentCatalog {
        &self.catalog
    }

    pub fn population(&self) -> &LabeledPopulation {
        &self.population
    }

    /// Shared handle to the labeled population.
    pub fn population_handle(&self) -> Arc<LabeledPopulation> {
        Arc::clone(&self.population)
    }

    pub fn assigner(&self) -> &SegmentAssigner<M> {
        &self.assigner
    }

    pub fn match_record(&self, record: &RespondentRecord) -> Result<SegmentReport> {
        let segment_id = self.assigner.assign_one(record)?;
        let info = self.catalog.get(&segment_id)?;
        let subset = filter_to_segment(&self.population, &segment_id);
        debug!(
            "respondent matched {} ({} members)",
            segment_id,
            subset.len()
        );
        Ok(SegmentReport::build(info, &subset))
    }

    /// Runs the whole pipeline if every answer is chosen, otherwise does nothing.
    pub fn evaluate(&self, selections: &Selections) -> Result<Outcome> {
        match selections.to_record() {
            Some(record) => self.match_record(&record).map(Outcome::Report),
            None => Ok(Outcome::Waiting),
        }
    }
}

impl SegmentFinder<CentroidModel> {
    /// Loads the model, catalog and population named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = CentroidModel::load_from_file(&config.model_path)?;
        let catalog = SegmentCatalog::from_json_file(&config.catalog_path)?;
        let population = ReferencePopulation::from_csv(&config.data_path, config.delimiter_byte()?)?;

        match &config.label_cache {
            Some(cache) => {
                let assigner = SegmentAssigner::new(model);
                let labeled = assigner.load_or_label_if_stale(
                    &population,
                    cache,
                    &[config.model_path.as_path(), config.data_path.as_path()],
                )?;
                Self::with_assigner(assigner, catalog, labeled)
            }
            None => Self::new(model, catalog, &population),
        }
    }
}
