//! Terminal output for reports and run summaries

use crate::ops::duplicate::{DuplicateOutcome, DuplicateSummary};
use crate::ops::report::{ReportMode, TagReport};
use crate::ops::Outcome;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

/// Build a table with headers and rows
pub fn build_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }

    table
}

/// Report rows with a running count
pub fn report_table(report: &TagReport) -> Table {
    let rows = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            vec![
                (i + 1).to_string(),
                row.resource.clone(),
                row.resource_type.clone(),
                row.tag.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    build_table(&["#", "Resource", "Type", "Tag"], rows)
}

pub fn report_title(report: &TagReport) -> String {
    let verb = match report.mode {
        ReportMode::Present => "with",
        ReportMode::Absent => "without",
    };
    format!("Resources {} tag(s) {}", verb, report.names.join(", "))
}

/// Failed resources of a duplicate-tag run
pub fn failure_table(summary: &DuplicateSummary) -> Table {
    let rows = summary
        .outcomes
        .iter()
        .filter_map(|(id, outcome)| match outcome {
            DuplicateOutcome::Failed(msg) => Some(vec![id.clone(), msg.clone()]),
            _ => None,
        })
        .collect();

    build_table(&["Resource", "Error"], rows)
}

/// Print whatever the outcome has to show on stdout
pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Reported(report) => {
            println!("{}", report_title(report));
            println!("{}", report_table(report));
            println!("Total: {}", report.total());
        }
        Outcome::Duplicated(summary) if !summary.failures().is_empty() => {
            println!("{}", failure_table(summary));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::report::ReportRow;

    fn report() -> TagReport {
        TagReport {
            mode: ReportMode::Present,
            names: vec!["env".to_string()],
            rows: vec![ReportRow {
                resource: "db1".to_string(),
                resource_type: "resource-instance".to_string(),
                tag: Some("env:prod".to_string()),
            }],
        }
    }

    #[test]
    fn test_report_table_contents() {
        let rendered = report_table(&report()).to_string();
        assert!(rendered.contains("db1"));
        assert!(rendered.contains("env:prod"));
        assert!(rendered.contains("Resource"));
    }

    #[test]
    fn test_report_title() {
        assert_eq!(report_title(&report()), "Resources with tag(s) env");
    }

    #[test]
    fn test_failure_table_lists_only_failures() {
        let summary = DuplicateSummary {
            outcomes: vec![
                ("crn:1".to_string(), DuplicateOutcome::Failed("boom".to_string())),
                ("crn:2".to_string(), DuplicateOutcome::Unchanged),
            ],
        };
        let rendered = failure_table(&summary).to_string();
        assert!(rendered.contains("crn:1"));
        assert!(rendered.contains("boom"));
        assert!(!rendered.contains("crn:2"));
    }
}
