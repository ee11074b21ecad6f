//! attach-tag and attach-unique-tag

use super::{references, Outcome};
use crate::ibm::service::TaggingService;
use crate::inventory::model::{tag_name, Resource};
use anyhow::Result;

/// Attach every tag to every resource in one batched call
pub async fn attach_tags(
    tagging: &dyn TaggingService,
    tags: &[String],
    resources: &[Resource],
) -> Result<Outcome> {
    if resources.is_empty() {
        tracing::warn!("[attach-tag] No resources selected, nothing to attach");
        return Ok(Outcome::skipped("no resources selected"));
    }

    tracing::debug!(
        "[attach-tag] Attaching {:?} to {} resource(s)",
        tags,
        resources.len()
    );
    tagging.attach_tags(tags, &references(resources)).await?;
    tracing::info!("[attach-tag] Successfully added tags to resources");

    Ok(Outcome::Applied {
        resources: resources.len(),
        calls: 1,
    })
}

/// Attach `tag` only where no tag with the same name exists yet
pub async fn attach_unique_tag(
    tagging: &dyn TaggingService,
    tag: &str,
    resources: &[Resource],
) -> Result<Outcome> {
    if resources.is_empty() {
        tracing::warn!("[attach-unique-tag] No resources selected, nothing to attach");
        return Ok(Outcome::skipped("no resources selected"));
    }

    let name = tag_name(tag);
    let targets: Vec<Resource> = resources
        .iter()
        .filter(|r| {
            let taken = r.has_tag_named(name);
            if taken {
                tracing::debug!(
                    "[attach-unique-tag] {} already has a '{}' tag, skipping",
                    r.name,
                    name
                );
            }
            !taken
        })
        .cloned()
        .collect();

    if targets.is_empty() {
        tracing::warn!(
            "[attach-unique-tag] Every selected resource already has a '{}' tag",
            name
        );
        return Ok(Outcome::skipped("tag name already present on every resource"));
    }

    tagging
        .attach_tags(&[tag.to_string()], &references(&targets))
        .await?;
    tracing::info!(
        "[attach-unique-tag] Added {} to {} of {} resource(s)",
        tag,
        targets.len(),
        resources.len()
    );

    Ok(Outcome::Applied {
        resources: targets.len(),
        calls: 1,
    })
}
