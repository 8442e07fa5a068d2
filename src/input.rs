//! Answer collection: the five selections and the scratch note next to them.

use crate::category::{Age, Category, EduLevel, FavAnimals, FavPlace, Field, Gender, PLACEHOLDER};
use crate::error::{Result, SegmentError};
use crate::population::RespondentRecord;

/// A single-choice answer that may still be at its placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    Unselected,
    Chosen(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::Unselected
    }
}

impl<T: Category> Selection<T> {
    /// Parses a raw option string. The placeholder (or an empty string) means unselected.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == PLACEHOLDER {
            return Ok(Selection::Unselected);
        }
        raw.parse().map(Selection::Chosen)
    }

    pub fn chosen(self) -> Option<T> {
        match self {
            Selection::Chosen(value) => Some(value),
            Selection::Unselected => None,
        }
    }

    pub fn is_chosen(self) -> bool {
        matches!(self, Selection::Chosen(_))
    }

    pub fn as_str(self) -> &'static str {
        self.chosen().map_or(PLACEHOLDER, Category::as_str)
    }
}

/// Current answers of one respondent. Everything starts unselected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selections {
    pub age: Selection<Age>,
    pub edu_level: Selection<EduLevel>,
    pub fav_animals: Selection<FavAnimals>,
    pub fav_place: Selection<FavPlace>,
    pub gender: Selection<Gender>,
}

impl Selections {
    /// True iff no field is at its placeholder.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Fields still at their placeholder, in question order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&f| self.get(f) == PLACEHOLDER)
            .collect()
    }

    /// Current value of `field`, or the placeholder text.
    pub fn get(&self, field: Field) -> &'static str {
        match field {
            Field::Age => self.age.as_str(),
            Field::EduLevel => self.edu_level.as_str(),
            Field::FavAnimals => self.fav_animals.as_str(),
            Field::FavPlace => self.fav_place.as_str(),
            Field::Gender => self.gender.as_str(),
        }
    }

    /// Sets `field` from a raw option string; see [`Selection::parse`].
    pub fn set(&mut self, field: Field, raw: &str) -> Result<()> {
        match field {
            Field::Age => self.age = Selection::parse(raw)?,
            Field::EduLevel => self.edu_level = Selection::parse(raw)?,
            Field::FavAnimals => self.fav_animals = Selection::parse(raw)?,
            Field::FavPlace => self.fav_place = Selection::parse(raw)?,
            Field::Gender => self.gender = Selection::parse(raw)?,
        }
        Ok(())
    }

    /// Sets `field` to its `index`-th option, where 0 is the placeholder.
    pub fn choose(&mut self, field: Field, index: usize) -> Result<()> {
        match index {
            0 => self.set(field, PLACEHOLDER),
            n => {
                let option = field.options().get(n - 1).ok_or_else(|| {
                    SegmentError::UnknownCategory {
                        field,
                        value: n.to_string(),
                    }
                })?;
                self.set(field, option)
            }
        }
    }

    /// The complete record, or `None` while any answer is missing.
    pub fn to_record(&self) -> Option<RespondentRecord> {
        Some(RespondentRecord {
            age: self.age.chosen()?,
            edu_level: self.edu_level.chosen()?,
            fav_animals: self.fav_animals.chosen()?,
            fav_place: self.fav_place.chosen()?,
            gender: self.gender.chosen()?,
        })
    }
}

impl From<RespondentRecord> for Selections {
    fn from(r: RespondentRecord) -> Self {
        Selections {
            age: Selection::Chosen(r.age),
            edu_level: Selection::Chosen(r.edu_level),
            fav_animals: Selection::Chosen(r.fav_animals),
            fav_place: Selection::Chosen(r.fav_place),
            gender: Selection::Chosen(r.gender),
        }
    }
}

/// Free-text notepad shown next to the questions. Lives in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchNote {
    text: String,
}

impl ScratchNote {
    pub const MAX_CHARS: usize = 1000;

    /// Replaces the note, keeping at most [`Self::MAX_CHARS`] characters.
    /// Returns `true` if the input had to be cut.
    pub fn set(&mut self, text: &str) -> bool {
        self.text = text.chars().take(Self::MAX_CHARS).collect();
        text.chars().count() > Self::MAX_CHARS
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
