//! detach-tag and detach-tag-by-name

use super::{references, Outcome};
use crate::ibm::service::TaggingService;
use crate::inventory::model::{tag_name, Resource};
use anyhow::Result;

/// Detach every tag from every resource in one batched call
pub async fn detach_tags(
    tagging: &dyn TaggingService,
    tags: &[String],
    resources: &[Resource],
) -> Result<Outcome> {
    if resources.is_empty() {
        tracing::warn!("[detach-tag] No resources selected, nothing to detach");
        return Ok(Outcome::skipped("no resources selected"));
    }

    tagging.detach_tags(tags, &references(resources)).await?;
    tracing::info!("[detach-tag] Successfully removed tags from resources");

    Ok(Outcome::Applied {
        resources: resources.len(),
        calls: 1,
    })
}

/// Detach, resource by resource, every live tag whose name is in `names`
pub async fn detach_tags_by_name(
    tagging: &dyn TaggingService,
    names: &[String],
    resources: &[Resource],
) -> Result<Outcome> {
    let mut calls = 0;
    let mut touched = 0;

    for resource in resources {
        tracing::debug!("[detach-tag-by-name] Recovering tags for resource {}", resource.id);
        let live = tagging.list_tags(&resource.id).await?;
        tracing::debug!(
            "[detach-tag-by-name] Tags returned for resource {}: {}",
            resource.id,
            live.len()
        );

        let doomed: Vec<String> = live
            .into_iter()
            .filter(|t| names.iter().any(|n| n == tag_name(t)))
            .collect();
        if doomed.is_empty() {
            continue;
        }

        tracing::info!(
            "[detach-tag-by-name] Removing {:?} from resource {}",
            doomed,
            resource.name
        );
        tagging
            .detach_tags(&doomed, &[resource.reference()])
            .await?;
        calls += 1;
        touched += 1;
    }

    Ok(Outcome::Applied {
        resources: touched,
        calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibm::mock::{MockTagging, TagCall};

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_detach_is_one_batched_call() {
        let tagging = MockTagging::new().with_live_tags("crn:1", ["env:prod", "team"]);
        let resources = vec![Resource::new("crn:1", "a"), Resource::new("crn:2", "b")];

        detach_tags(&tagging, &strings(&["env:prod"]), &resources)
            .await
            .unwrap();

        assert_eq!(tagging.mutation_calls().await.len(), 1);
        assert_eq!(tagging.tags_of("crn:1").await, vec!["team"]);
    }

    #[tokio::test]
    async fn test_detach_by_name_uses_live_tags() {
        // Snapshot is stale: it has no env tag, but the live list does
        let tagging = MockTagging::new()
            .with_live_tags("crn:1", ["env:prod", "envoy:x", "team:a"])
            .with_live_tags("crn:2", ["team:b"]);
        let resources = vec![Resource::new("crn:1", "a"), Resource::new("crn:2", "b")];

        let outcome = detach_tags_by_name(&tagging, &strings(&["env", "owner"]), &resources)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Applied { resources: 1, calls: 1 });
        assert_eq!(tagging.tags_of("crn:1").await, vec!["envoy:x", "team:a"]);
        assert_eq!(
            tagging.calls().await,
            vec![
                TagCall::List("crn:1".to_string()),
                TagCall::Detach {
                    tags: strings(&["env:prod"]),
                    resources: strings(&["crn:1"]),
                },
                TagCall::List("crn:2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_detach_by_name_aborts_on_first_error() {
        let tagging = MockTagging::new()
            .with_live_tags("crn:2", ["env:prod"])
            .failing_list_for("crn:1");
        let resources = vec![Resource::new("crn:1", "a"), Resource::new("crn:2", "b")];

        tokio_test::assert_err!(detach_tags_by_name(&tagging, &strings(&["env"]), &resources).await);
        assert_eq!(tagging.tags_of("crn:2").await, vec!["env:prod"]);
    }
}
