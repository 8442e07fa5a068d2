//! Closed categorical domains for the five survey questions.
//!
//! Every answer is one of a fixed set of strings. The strings are exactly the ones used in the
//! reference data and in the model's one-hot vocabulary, so they double as wire values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SegmentError;

/// Text shown for a question that has not been answered yet.
pub const PLACEHOLDER: &str = "-- Wybierz --";

/// One of the five survey questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Age,
    EduLevel,
    FavAnimals,
    FavPlace,
    Gender,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Age,
        Field::EduLevel,
        Field::FavAnimals,
        Field::FavPlace,
        Field::Gender,
    ];

    /// Column name in the reference data and in model input tables.
    pub fn column(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::EduLevel => "edu_level",
            Field::FavAnimals => "fav_animals",
            Field::FavPlace => "fav_place",
            Field::Gender => "gender",
        }
    }

    /// Question label shown to the respondent.
    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Wiek",
            Field::EduLevel => "Wykształcenie",
            Field::FavAnimals => "Ulubione zwierzęta",
            Field::FavPlace => "Ulubione miejsce",
            Field::Gender => "Płeć",
        }
    }

    /// Valid answers, in presentation order.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            Field::Age => Age::LABELS,
            Field::EduLevel => EduLevel::LABELS,
            Field::FavAnimals => FavAnimals::LABELS,
            Field::FavPlace => FavPlace::LABELS,
            Field::Gender => Gender::LABELS,
        }
    }

    /// Returns the canonical `'static` spelling of `value` if it belongs to this field.
    pub fn canonical(self, value: &str) -> Option<&'static str> {
        self.options().iter().copied().find(|option| *option == value)
    }

    pub fn from_column(column: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.column() == column)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A closed set of answers for one [`Field`].
pub trait Category: Copy + Eq + fmt::Debug + FromStr<Err = SegmentError> + 'static {
    const FIELD: Field;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;
}

macro_rules! category {
    ($(#[$meta:meta])* $name:ident, $field:expr, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const LABELS: &'static [&'static str] = &[$($label),+];
        }

        impl Category for $name {
            const FIELD: Field = $field;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = SegmentError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(SegmentError::UnknownCategory {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

category!(
    /// Age bracket.
    Age, Field::Age, {
        Under18 => "<18",
        From18To24 => "18-24",
        From25To34 => "25-34",
        From35To44 => "35-44",
        From45To54 => "45-54",
        From55To64 => "55-64",
        Over65 => ">=65",
        Unknown => "unknown",
    }
);

category!(
    /// Highest completed education.
    EduLevel, Field::EduLevel, {
        Primary => "Podstawowe",
        Secondary => "Średnie",
        Higher => "Wyższe",
    }
);

category!(
    FavAnimals, Field::FavAnimals, {
        NoFavorite => "Brak ulubionych",
        Dogs => "Psy",
        Cats => "Koty",
        Other => "Inne",
        CatsAndDogs => "Koty i Psy",
    }
);

category!(
    FavPlace, Field::FavPlace, {
        ByTheWater => "Nad wodą",
        InTheForest => "W lesie",
        InTheMountains => "W górach",
        Other => "Inne",
    }
);

category!(
    Gender, Field::Gender, {
        Male => "Mężczyzna",
        Female => "Kobieta",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for age in Age::ALL {
            assert_eq!(age.as_str().parse::<Age>().unwrap(), *age);
        }
        assert_eq!("Koty i Psy".parse::<FavAnimals>().unwrap(), FavAnimals::CatsAndDogs);
    }

    #[test]
    fn placeholder_is_not_a_member_of_any_domain() {
        for field in Field::ALL {
            assert!(field.canonical(PLACEHOLDER).is_none(), "{field}");
        }
        assert!(PLACEHOLDER.parse::<Gender>().is_err());
    }

    #[test]
    fn unknown_value_names_the_field() {
        let err = "Delfiny".parse::<FavAnimals>().unwrap_err();
        match err {
            SegmentError::UnknownCategory { field, value } => {
                assert_eq!(field, Field::FavAnimals);
                assert_eq!(value, "Delfiny");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn field_lookup_by_column() {
        assert_eq!(Field::from_column("edu_level"), Some(Field::EduLevel));
        assert_eq!(Field::from_column("Cluster"), None);
        assert_eq!(Field::Gender.options(), &["Mężczyzna", "Kobieta"]);
    }
}
