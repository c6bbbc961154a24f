//! Compact terminal summary printed after an assessment.

use colored::{ColoredString, Colorize};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use super::format_number;
use crate::scoring::{Dimension, Grade, ScoreBundle};

fn colored_grade(grade: Grade) -> ColoredString {
    let label = grade.as_str();
    match grade {
        Grade::Excellent => label.green().bold(),
        Grade::Good => label.green(),
        Grade::Fair => label.yellow(),
        Grade::Poor => label.red().bold(),
        Grade::NotAvailable => label.dimmed(),
    }
}

/// Table of every dimension followed by the overall line
pub fn render_summary(bundle: &ScoreBundle) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dimension", "Score", "Grade"]);

    for dimension in Dimension::ALL {
        table.add_row(vec![
            Cell::new(dimension.label()),
            Cell::new(format_number(bundle.score(dimension))).set_alignment(CellAlignment::Right),
            Cell::new(colored_grade(bundle.grade(dimension))),
        ]);
    }

    format!(
        "{}\n{} {} ({})",
        table,
        "Overall Score:".bold(),
        format_number(bundle.overall_score),
        colored_grade(bundle.overall_grade)
    )
}

pub fn print_summary(bundle: &ScoreBundle) {
    println!("{}", render_summary(bundle));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsBundle;
    use crate::scoring::compute_scores;

    #[test]
    fn test_summary_lists_every_dimension() {
        colored::control::set_override(false);
        let bundle = compute_scores(&MetricsBundle::new());
        let summary = render_summary(&bundle);

        for dimension in Dimension::ALL {
            assert!(summary.contains(dimension.label()), "{}", dimension.label());
        }
        assert!(summary.contains("Overall Score: 100.0 (Excellent)"));
        assert!(summary.contains("null"));
    }
}
