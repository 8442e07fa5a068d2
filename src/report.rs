//! Descriptive statistics over the members of one segment.
//!
//! All functions here are pure reads over an already labeled population. Missing answers
//! (blank cells in the reference data) are skipped when counting categories but still count
//! as members of the segment.

use crate::catalog::SegmentInfo;
use crate::category::Field;
use crate::population::{LabeledPopulation, SurveyRow};
use crate::segment::SegmentId;

/// Fields whose most common answer is reported, in display order.
pub const TOP_CHOICE_FIELDS: [Field; 3] = [Field::FavAnimals, Field::FavPlace, Field::EduLevel];

/// Reference rows belonging to one segment, in population order.
#[derive(Debug, Clone)]
pub struct SegmentSubset<'a> {
    segment_id: SegmentId,
    rows: Vec<&'a SurveyRow>,
}

impl<'a> SegmentSubset<'a> {
    pub fn segment_id(&self) -> &SegmentId {
        &self.segment_id
    }

    pub fn rows(&self) -> &[&'a SurveyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All rows of `population` labeled `segment_id`. Empty when the id does not occur.
pub fn filter_to_segment<'a>(
    population: &'a LabeledPopulation,
    segment_id: &SegmentId,
) -> SegmentSubset<'a> {
    SegmentSubset {
        segment_id: segment_id.clone(),
        rows: population
            .rows()
            .iter()
            .filter(|r| &r.segment_id == segment_id)
            .map(|r| &r.row)
            .collect(),
    }
}

pub fn population_size(subset: &SegmentSubset<'_>) -> usize {
    subset.len()
}

/// Observed answer counts for one field, in the field's option order.
/// Options nobody in the subset picked are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    field: Field,
    counts: Vec<(&'static str, usize)>,
}

impl Distribution {
    pub fn field(&self) -> Field {
        self.field
    }

    pub fn get(&self, value: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }
}

pub fn distribution(subset: &SegmentSubset<'_>, field: Field) -> Distribution {
    let options = field.options();
    let mut counts = vec![0usize; options.len()];
    for value in subset.rows.iter().filter_map(|r| r.value(field)) {
        if let Some(idx) = options.iter().position(|o| *o == value) {
            counts[idx] += 1;
        }
    }

    Distribution {
        field,
        counts: options
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(option, count)| (*option, count))
            .collect(),
    }
}

/// The answer given most often for `field`, or `None` if nobody in the subset answered it.
///
/// Ties go to the answer that appears first in the subset's row order, so the result is
/// stable for a fixed population.
pub fn most_common(subset: &SegmentSubset<'_>, field: Field) -> Option<&'static str> {
    // (value, count, first row index)
    let mut tally: Vec<(&'static str, usize, usize)> = Vec::new();
    for (idx, value) in subset
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.value(field).map(|v| (i, v)))
    {
        match tally.iter_mut().find(|(v, _, _)| *v == value) {
            Some(entry) => entry.1 += 1,
            None => tally.push((value, 1, idx)),
        }
    }

    tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)))
        .map(|(value, _, _)| value)
}

/// Share of the segment that gave each answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Proportions {
    field: Field,
    shares: Vec<(&'static str, f64)>,
}

impl Proportions {
    pub fn field(&self) -> Field {
        self.field
    }

    pub fn get(&self, value: &str) -> Option<f64> {
        self.shares
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, share)| *share)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.shares.iter().copied()
    }

    pub fn total(&self) -> f64 {
        self.shares.iter().map(|(_, s)| s).sum()
    }
}

/// Each answer's count divided by the segment size. `None` for an empty segment.
pub fn proportions(subset: &SegmentSubset<'_>, field: Field) -> Option<Proportions> {
    if subset.is_empty() {
        return None;
    }
    let size = subset.len() as f64;
    Some(Proportions {
        field,
        shares: distribution(subset, field)
            .iter()
            .map(|(value, count)| (value, count as f64 / size))
            .collect(),
    })
}

pub fn gender_proportions(subset: &SegmentSubset<'_>) -> Option<Proportions> {
    proportions(subset, Field::Gender)
}

/// Everything shown to a respondent about the segment they were matched to.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub segment_id: SegmentId,
    pub name: String,
    pub description: String,
    pub population_size: usize,
    /// Most common answer per [`TOP_CHOICE_FIELDS`] entry; `None` when not available.
    pub top_choices: Vec<(Field, Option<&'static str>)>,
    /// One distribution per field, in [`Field::ALL`] order.
    pub distributions: Vec<Distribution>,
    pub gender_proportions: Option<Proportions>,
}

impl SegmentReport {
    pub fn build(info: &SegmentInfo, subset: &SegmentSubset<'_>) -> Self {
        SegmentReport {
            segment_id: subset.segment_id().clone(),
            name: info.name.clone(),
            description: info.description.clone(),
            population_size: population_size(subset),
            top_choices: TOP_CHOICE_FIELDS
                .iter()
                .map(|&field| (field, most_common(subset, field)))
                .collect(),
            distributions: Field::ALL
                .iter()
                .map(|&field| distribution(subset, field))
                .collect(),
            gender_proportions: gender_proportions(subset),
        }
    }

    pub fn distribution(&self, field: Field) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.field() == field)
    }

    pub fn top_choice(&self, field: Field) -> Option<&'static str> {
        self.top_choices
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, value)| *value)
    }
}
