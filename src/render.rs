//! Plain-text rendering of a [`SegmentReport`] for the terminal.

use std::fmt;

use crate::category::Field;
use crate::report::{Distribution, Proportions, SegmentReport};

const BAR_WIDTH: usize = 30;

/// Label used for a field in the "most common answers" section.
fn top_choice_label(field: Field) -> &'static str {
    match field {
        Field::FavAnimals => "Ulubione zwierze",
        Field::FavPlace => "Ulubione miejsce",
        Field::EduLevel => "Poziom wykształcenia",
        other => other.label(),
    }
}

fn distribution_title(field: Field) -> &'static str {
    match field {
        Field::Age => "Rozkład wieku w grupie",
        Field::EduLevel => "Rozkład wykształcenia w grupie",
        Field::FavAnimals => "Rozkład ulubionych zwierząt w grupie",
        Field::FavPlace => "Rozkład ulubionych miejsc w grupie",
        Field::Gender => "Rozkład płci w grupie",
    }
}

/// Displays a whole report; see [`render_report`].
pub struct ReportView<'a>(pub &'a SegmentReport);

/// Displays one distribution as a horizontal bar chart, one line per observed answer.
pub struct DistributionView<'a>(pub &'a Distribution);

/// Displays answer shares as percentages.
pub struct ProportionsView<'a>(pub &'a Proportions);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "🎯 Najbliżej Ci do grupy: {}", report.name)?;
        writeln!(f, "{}", report.description)?;
        writeln!(f)?;
        writeln!(f, "Liczba twoich znajomych: {}", report.population_size)?;
        writeln!(f)?;

        writeln!(f, "🏆 Najczęściej wybierane opcje w Twojej grupie")?;
        for (field, value) in &report.top_choices {
            writeln!(
                f,
                "🔹 Najczęściej wybierane {}: {}",
                top_choice_label(*field),
                value.unwrap_or("brak danych")
            )?;
        }
        writeln!(f)?;

        writeln!(f, "📊 Rozkłady w Twojej grupie")?;
        for dist in &report.distributions {
            writeln!(f, "{}", DistributionView(dist))?;
        }

        match &report.gender_proportions {
            Some(shares) => write!(f, "{}", ProportionsView(shares)),
            None => writeln!(f, "Proporcje procentowe płci: brak danych"),
        }
    }
}

impl fmt::Display for DistributionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dist = self.0;
        writeln!(f, "{}", distribution_title(dist.field()))?;
        if dist.is_empty() {
            return writeln!(f, "  (brak danych)");
        }

        let label_width = dist
            .iter()
            .map(|(value, _)| value.chars().count())
            .max()
            .unwrap_or(0);
        let max = dist.max_count().max(1);

        for (value, count) in dist.iter() {
            let bar = (count * BAR_WIDTH).div_ceil(max);
            let pad = label_width - value.chars().count();
            writeln!(
                f,
                "  {value}{} | {} {count}",
                " ".repeat(pad),
                "█".repeat(bar)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ProportionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Proporcje procentowe płci")?;
        for (value, share) in self.0.iter() {
            writeln!(f, "  {value}: {:.1}%", share * 100.0)?;
        }
        Ok(())
    }
}

pub fn render_report(report: &SegmentReport) -> String {
    ReportView(report).to_string()
}

pub fn render_distribution(dist: &Distribution) -> String {
    DistributionView(dist).to_string()
}

pub fn render_proportions(shares: &Proportions) -> String {
    ProportionsView(shares).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SegmentInfo;
    use crate::category::{Age, EduLevel, Gender};
    use crate::population::{LabeledPopulation, LabeledRow, SurveyRow};
    use crate::report::filter_to_segment;

    fn report(rows: usize) -> SegmentReport {
        let row = SurveyRow {
            age: Some(Age::From25To34),
            edu_level: Some(EduLevel::Higher),
            gender: Some(Gender::Female),
            ..SurveyRow::default()
        };
        let pop = LabeledPopulation::new(
            (0..rows)
                .map(|_| LabeledRow { row, segment_id: "Cluster 0".into() })
                .collect(),
        );
        let subset = filter_to_segment(&pop, &"Cluster 0".into());
        let info = SegmentInfo {
            name: "Miejscy profesjonaliści".into(),
            description: "Wykształceni mieszczuchy.".into(),
        };
        SegmentReport::build(&info, &subset)
    }

    #[test]
    fn report_mentions_name_size_and_choices() {
        let text = render_report(&report(4));
        assert!(text.contains("Najbliżej Ci do grupy: Miejscy profesjonaliści"));
        assert!(text.contains("Liczba twoich znajomych: 4"));
        assert!(text.contains("Poziom wykształcenia: Wyższe"));
        assert!(text.contains("Ulubione zwierze: brak danych"));
        assert!(text.contains("Kobieta: 100.0%"));
    }

    #[test]
    fn full_bar_for_the_largest_count() {
        let r = report(2);
        let text = render_distribution(r.distribution(Field::Age).unwrap());
        assert!(text.contains(&format!("25-34 | {} 2", "█".repeat(BAR_WIDTH))));
    }

    #[test]
    fn empty_report_renders_placeholders() {
        let text = render_report(&report(0));
        assert!(text.contains("Liczba twoich znajomych: 0"));
        assert!(text.contains("Proporcje procentowe płci: brak danych"));
        assert!(text.contains("(brak danych)"));
    }

    #[test]
    fn views_compose_into_the_full_report() {
        let r = report(3);
        let text = format!("{}", ReportView(&r));
        assert_eq!(text, render_report(&r));

        let shares = render_proportions(r.gender_proportions.as_ref().unwrap());
        assert!(text.ends_with(&shares));
        for dist in &r.distributions {
            assert!(text.contains(&format!("{}\n", render_distribution(dist))));
        }
    }
}
