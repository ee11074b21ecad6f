//! report-present-tags and report-absent-tags
//!
//! Pure projections over the snapshot; no service calls.

use crate::inventory::model::{tag_name, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// One row per resource and matching tag
    Present,
    /// One row per resource without any matching tag
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub resource: String,
    pub resource_type: String,
    /// Matching tag; `None` in absent mode
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReport {
    pub mode: ReportMode,
    pub names: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl TagReport {
    pub fn total(&self) -> usize {
        self.rows.len()
    }
}

pub fn build_report(mode: ReportMode, names: &[String], resources: &[Resource]) -> TagReport {
    let matches = |tag: &String| names.iter().any(|n| n == tag_name(tag));
    let mut rows = Vec::new();

    for resource in resources {
        match mode {
            ReportMode::Present => {
                rows.extend(resource.tags.iter().filter(|t| matches(*t)).map(|t| ReportRow {
                    resource: resource.name.clone(),
                    resource_type: resource.resource_type.clone(),
                    tag: Some(t.clone()),
                }));
            }
            ReportMode::Absent => {
                if !resource.tags.iter().any(matches) {
                    rows.push(ReportRow {
                        resource: resource.name.clone(),
                        resource_type: resource.resource_type.clone(),
                        tag: None,
                    });
                }
            }
        }
    }

    tracing::info!(
        "[report] {} row(s) for {:?} over {} resource(s)",
        rows.len(),
        names,
        resources.len()
    );

    TagReport {
        mode,
        names: names.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn inventory() -> Vec<Resource> {
        vec![
            Resource::new("crn:1", "db1").with_tags(["env:prod", "team:a"]),
            Resource::new("crn:2", "db2").with_tags(["env:dev", "env:qa"]),
            Resource::new("crn:3", "db3").with_tags(["environment:x"]),
        ]
    }

    #[test]
    fn test_present_lists_each_matching_pair() {
        let report = build_report(ReportMode::Present, &names(&["env"]), &inventory());
        let rows: Vec<(&str, Option<&str>)> = report
            .rows
            .iter()
            .map(|r| (r.resource.as_str(), r.tag.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("db1", Some("env:prod")),
                ("db2", Some("env:dev")),
                ("db2", Some("env:qa")),
            ]
        );
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_absent_lists_resources_without_match() {
        let report = build_report(ReportMode::Absent, &names(&["env", "team"]), &inventory());
        assert_eq!(report.total(), 1);
        assert_eq!(report.rows[0].resource, "db3");
        assert_eq!(report.rows[0].tag, None);
    }

    #[test]
    fn test_empty_inventory_reports_zero() {
        let report = build_report(ReportMode::Present, &names(&["env"]), &[]);
        assert_eq!(report.total(), 0);
    }
}
