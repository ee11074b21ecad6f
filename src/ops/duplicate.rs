//! duplicate-tag
//!
//! Copies the value of one tag into another tag name, resource by resource.
//! This is the only operation that isolates failures: a resource that errors
//! is recorded as failed and the loop moves on to the next one.

use super::replace::swap_tag;
use crate::ibm::service::TaggingService;
use crate::inventory::model::{join_tag, split_tag, tag_name, Resource};
use anyhow::Result;

/// What happened on one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateOutcome {
    /// Target tag was absent and has been attached
    Attached(String),
    /// Target tag held another value and has been replaced
    Replaced { previous: String, current: String },
    /// Target tag already carries the source value
    Unchanged,
    /// Resource has no source tag
    MissingSource,
    /// Listing or mutating failed; the message is kept for the summary
    Failed(String),
}

/// Per-resource outcomes, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSummary {
    pub outcomes: Vec<(String, DuplicateOutcome)>,
}

impl DuplicateSummary {
    pub fn changed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DuplicateOutcome::Attached(_) | DuplicateOutcome::Replaced { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DuplicateOutcome::Unchanged | DuplicateOutcome::MissingSource))
            .count()
    }

    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(id, o)| match o {
                DuplicateOutcome::Failed(msg) => Some((id.as_str(), msg.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// Copy `source_name`'s value into `target_name` on every resource
pub async fn duplicate_tag(
    tagging: &dyn TaggingService,
    source_name: &str,
    target_name: &str,
    resources: &[Resource],
) -> DuplicateSummary {
    let mut summary = DuplicateSummary::default();

    for resource in resources {
        let outcome = match duplicate_on(tagging, source_name, target_name, resource).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    "[duplicate-tag] Failed on resource {}: {:#}",
                    resource.name,
                    e
                );
                DuplicateOutcome::Failed(format!("{:#}", e))
            }
        };
        summary.outcomes.push((resource.id.clone(), outcome));
    }

    tracing::info!(
        "[duplicate-tag] {} changed, {} skipped, {} failed",
        summary.changed(),
        summary.skipped(),
        summary.failures().len()
    );

    summary
}

async fn duplicate_on(
    tagging: &dyn TaggingService,
    source_name: &str,
    target_name: &str,
    resource: &Resource,
) -> Result<DuplicateOutcome> {
    let live = tagging.list_tags(&resource.id).await?;

    let Some(source) = live.iter().find(|t| tag_name(t) == source_name) else {
        tracing::info!(
            "[duplicate-tag] Resource {} has no '{}' tag, skipping",
            resource.name,
            source_name
        );
        return Ok(DuplicateOutcome::MissingSource);
    };

    let desired = join_tag(target_name, split_tag(source).1);
    let target = [resource.reference()];

    match live.iter().find(|t| tag_name(t) == target_name) {
        Some(existing) if *existing == desired => Ok(DuplicateOutcome::Unchanged),
        Some(existing) => {
            tracing::info!(
                "[duplicate-tag] Replacing {} with {} on resource {}",
                existing,
                desired,
                resource.name
            );
            swap_tag(tagging, existing, &desired, &target).await?;
            Ok(DuplicateOutcome::Replaced {
                previous: existing.clone(),
                current: desired,
            })
        }
        None => {
            tracing::info!("[duplicate-tag] Adding {} to resource {}", desired, resource.name);
            tagging.attach_tags(&[desired.clone()], &target).await?;
            Ok(DuplicateOutcome::Attached(desired))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibm::mock::MockTagging;

    #[tokio::test]
    async fn test_attaches_when_target_absent() {
        let tagging = MockTagging::new().with_live_tags("crn:1", ["env:prod"]);
        let resources = vec![Resource::new("crn:1", "a")];

        let summary = duplicate_tag(&tagging, "env", "stage", &resources).await;

        assert_eq!(
            summary.outcomes,
            vec![("crn:1".to_string(), DuplicateOutcome::Attached("stage:prod".to_string()))]
        );
        assert_eq!(tagging.tags_of("crn:1").await, vec!["env:prod", "stage:prod"]);
    }

    #[tokio::test]
    async fn test_replaces_target_with_other_value() {
        let tagging = MockTagging::new().with_live_tags("crn:1", ["env:prod", "stage:dev"]);
        let resources = vec![Resource::new("crn:1", "a")];

        let summary = duplicate_tag(&tagging, "env", "stage", &resources).await;

        assert_eq!(
            summary.outcomes[0].1,
            DuplicateOutcome::Replaced {
                previous: "stage:dev".to_string(),
                current: "stage:prod".to_string(),
            }
        );
        assert_eq!(tagging.tags_of("crn:1").await, vec!["env:prod", "stage:prod"]);
    }

    #[tokio::test]
    async fn test_unchanged_and_missing_source_issue_no_mutation() {
        let tagging = MockTagging::new()
            .with_live_tags("crn:1", ["env:prod", "stage:prod"])
            .with_live_tags("crn:2", ["team:x"]);
        let resources = vec![Resource::new("crn:1", "a"), Resource::new("crn:2", "b")];

        let summary = duplicate_tag(&tagging, "env", "stage", &resources).await;

        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.outcomes[0].1, DuplicateOutcome::Unchanged);
        assert_eq!(summary.outcomes[1].1, DuplicateOutcome::MissingSource);
        assert!(tagging.mutation_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_on_one_resource_does_not_stop_the_rest() {
        let tagging = MockTagging::new()
            .failing_list_for("crn:1")
            .with_live_tags("crn:2", ["env:prod"]);
        let resources = vec![Resource::new("crn:1", "a"), Resource::new("crn:2", "b")];

        let summary = duplicate_tag(&tagging, "env", "stage", &resources).await;

        assert_eq!(summary.failures().len(), 1);
        assert_eq!(summary.failures()[0].0, "crn:1");
        assert_eq!(summary.changed(), 1);
        assert_eq!(tagging.tags_of("crn:2").await, vec!["env:prod", "stage:prod"]);
    }

    #[tokio::test]
    async fn test_valueless_source_copies_bare_name() {
        let tagging = MockTagging::new().with_live_tags("crn:1", ["critical"]);
        let resources = vec![Resource::new("crn:1", "a")];

        let summary = duplicate_tag(&tagging, "critical", "pager", &resources).await;

        assert_eq!(summary.outcomes[0].1, DuplicateOutcome::Attached("pager".to_string()));
    }
}
