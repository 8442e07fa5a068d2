//! Respondent records and the reference population they are compared against.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::category::{Age, Category, EduLevel, FavAnimals, FavPlace, Field, Gender};
use crate::error::Result;
use crate::segment::SegmentId;
use crate::table::Table;

/// A fully answered survey: one value per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RespondentRecord {
    pub age: Age,
    pub edu_level: EduLevel,
    pub fav_animals: FavAnimals,
    pub fav_place: FavPlace,
    pub gender: Gender,
}

impl RespondentRecord {
    pub fn value(&self, field: Field) -> &'static str {
        match field {
            Field::Age => self.age.as_str(),
            Field::EduLevel => self.edu_level.as_str(),
            Field::FavAnimals => self.fav_animals.as_str(),
            Field::FavPlace => self.fav_place.as_str(),
            Field::Gender => self.gender.as_str(),
        }
    }

    /// Builds the one-row table handed to the model.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(Field::ALL.map(Field::column));
        table
            .push_row(Field::ALL.map(|f| self.value(f)))
            .expect("row width matches Field::ALL");
        table
    }
}

/// One row of the reference data. Blank cells are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurveyRow {
    pub age: Option<Age>,
    pub edu_level: Option<EduLevel>,
    pub fav_animals: Option<FavAnimals>,
    pub fav_place: Option<FavPlace>,
    pub gender: Option<Gender>,
}

impl SurveyRow {
    pub fn value(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::Age => self.age.map(Category::as_str),
            Field::EduLevel => self.edu_level.map(Category::as_str),
            Field::FavAnimals => self.fav_animals.map(Category::as_str),
            Field::FavPlace => self.fav_place.map(Category::as_str),
            Field::Gender => self.gender.map(Category::as_str),
        }
    }
}

impl From<RespondentRecord> for SurveyRow {
    fn from(r: RespondentRecord) -> Self {
        SurveyRow {
            age: Some(r.age),
            edu_level: Some(r.edu_level),
            fav_animals: Some(r.fav_animals),
            fav_place: Some(r.fav_place),
            gender: Some(r.gender),
        }
    }
}

/// Prior respondents, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferencePopulation {
    rows: Vec<SurveyRow>,
}

impl ReferencePopulation {
    pub fn new(rows: Vec<SurveyRow>) -> Self {
        ReferencePopulation { rows }
    }

    /// Loads delimited survey data with a header row. Extra columns are ignored.
    pub fn from_csv(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path)?;
        let population = Self::from_reader(file, delimiter)?;
        info!(
            "loaded {} reference respondents from {}",
            population.len(),
            path.display()
        );
        Ok(population)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let row: SurveyRow = result?;
            rows.push(row);
        }
        Ok(ReferencePopulation { rows })
    }

    pub fn rows(&self) -> &[SurveyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds the multi-row table handed to the model.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(Field::ALL.map(Field::column));
        for row in &self.rows {
            table
                .push_row(Field::ALL.map(|f| row.value(f).unwrap_or("")))
                .expect("row width matches Field::ALL");
        }
        table
    }
}

/// A reference row together with the segment the model put it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRow {
    pub row: SurveyRow,
    pub segment_id: SegmentId,
}

/// The reference population after labeling. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabeledPopulation {
    rows: Vec<LabeledRow>,
}

impl LabeledPopulation {
    pub fn new(rows: Vec<LabeledRow>) -> Self {
        LabeledPopulation { rows }
    }

    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct segment ids, in order of first appearance.
    pub fn segment_ids(&self) -> Vec<&SegmentId> {
        let mut seen: Vec<&SegmentId> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&&row.segment_id) {
                seen.push(&row.segment_id);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
age;edu_level;fav_animals;fav_place;gender;extra
18-24;Wyższe;Psy;W lesie;Kobieta;x
<18;Średnie;Koty i Psy;;Mężczyzna;y
unknown;Podstawowe;Brak ulubionych;Nad wodą;;z
";

    #[test]
    fn reads_semicolon_data_with_blanks() {
        let pop = ReferencePopulation::from_reader(SAMPLE.as_bytes(), b';').unwrap();
        assert_eq!(pop.len(), 3);

        let first = pop.rows()[0];
        assert_eq!(first.age, Some(Age::From18To24));
        assert_eq!(first.edu_level, Some(EduLevel::Higher));
        assert_eq!(first.gender, Some(Gender::Female));

        assert_eq!(pop.rows()[1].fav_place, None);
        assert_eq!(pop.rows()[1].fav_animals, Some(FavAnimals::CatsAndDogs));
        assert_eq!(pop.rows()[2].gender, None);
    }

    #[test]
    fn rejects_values_outside_the_domain() {
        let data = "age;edu_level;fav_animals;fav_place;gender\n18-24;Doktorat;Psy;W lesie;Kobieta\n";
        assert!(ReferencePopulation::from_reader(data.as_bytes(), b';').is_err());
    }

    #[test]
    fn table_uses_empty_cells_for_missing_values() {
        let pop = ReferencePopulation::from_reader(SAMPLE.as_bytes(), b';').unwrap();
        let table = pop.to_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(1, "fav_place"), Some(""));
        assert_eq!(table.cell(0, "fav_animals"), Some("Psy"));
        assert!(table.column_index("extra").is_none());
    }

    #[test]
    fn respondent_table_has_one_row() {
        let record = RespondentRecord {
            age: Age::From35To44,
            edu_level: EduLevel::Secondary,
            fav_animals: FavAnimals::Cats,
            fav_place: FavPlace::InTheMountains,
            gender: Gender::Male,
        };
        let table = record.to_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "fav_place"), Some("W górach"));
        assert_eq!(SurveyRow::from(record).value(Field::Age), Some("35-44"));
    }

    #[test]
    fn segment_ids_in_first_seen_order() {
        let row = SurveyRow::default();
        let pop = LabeledPopulation::new(vec![
            LabeledRow { row, segment_id: "Cluster 2".into() },
            LabeledRow { row, segment_id: "Cluster 0".into() },
            LabeledRow { row, segment_id: "Cluster 2".into() },
        ]);
        let ids: Vec<&str> = pop.segment_ids().into_iter().map(SegmentId::as_str).collect();
        assert_eq!(ids, ["Cluster 2", "Cluster 0"]);
    }
}
