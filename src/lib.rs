//! # survey_segments 🎯👥
//!
//! Match a survey respondent to a population segment and describe who else is in it.
//!
//! A respondent answers five single-choice questions (age, education, favourite animals,
//! favourite place, gender). A pre-trained segmentation model assigns them to a segment, and
//! the crate reports how many reference respondents share that segment, their most common
//! answers and the full answer distributions.
//!
//! ## Features
//! - Closed, typed answer domains with an explicit "not selected yet" state
//! - Pluggable [`SegmentModel`] with a bundled nearest-centroid backend
//!   ([`CentroidModel`], one-hot encoding with [`ndarray`], linfa's predict API)
//! - Model persistence as JSON or MessagePack (`rmp-serde`)
//! - Reference population labeled once per process, optionally cached on disk
//! - Segment size, most common answers, distributions and proportions
//!
//! ## Example
//! ```rust,no_run
//! use survey_segments::{Config, Field, Outcome, SegmentFinder, Selections};
//!
//! let finder = SegmentFinder::from_config(&Config::default())?;
//!
//! let mut answers = Selections::default();
//! answers.set(Field::Age, "25-34")?;
//! answers.set(Field::EduLevel, "Wyższe")?;
//! answers.set(Field::FavAnimals, "Psy")?;
//! answers.set(Field::FavPlace, "W górach")?;
//! answers.set(Field::Gender, "Kobieta")?;
//!
//! if let Outcome::Report(report) = finder.evaluate(&answers)? {
//!     println!("{}: {} people", report.name, report.population_size);
//! }
//! # Ok::<(), survey_segments::SegmentError>(())
//! ```

pub mod assigner;
pub mod catalog;
pub mod category;
pub mod config;
pub mod finder;
pub mod input;
pub mod model;
pub mod population;
pub mod render;
pub mod report;
pub mod segment;
pub mod table;

mod error;

pub use assigner::SegmentAssigner;
pub use catalog::{SegmentCatalog, SegmentInfo};
pub use category::{Age, Category, EduLevel, FavAnimals, FavPlace, Field, Gender, PLACEHOLDER};
pub use config::Config;
pub use error::{Result, SegmentError};
pub use finder::{Outcome, SegmentFinder, WAITING_PROMPT};
pub use input::{ScratchNote, Selection, Selections};
pub use model::{CentroidModel, FeatureColumn, SegmentModel};
pub use population::{
    LabeledPopulation, LabeledRow, ReferencePopulation, RespondentRecord, SurveyRow,
};
pub use report::{
    Distribution, Proportions, SegmentReport, SegmentSubset, distribution, filter_to_segment,
    gender_proportions, most_common, population_size, proportions,
};
pub use segment::SegmentId;
pub use table::Table;
