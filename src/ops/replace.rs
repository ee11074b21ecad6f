//! replace-tag and replace-tag-name

use super::{references, Outcome};
use crate::ibm::service::TaggingService;
use crate::inventory::model::{join_tag, split_tag, Resource, ResourceRef};
use anyhow::Result;

/// Replace `old` with `new` on every resource whose snapshot holds `old` exactly
pub async fn replace_tag(
    tagging: &dyn TaggingService,
    old: &str,
    new: &str,
    resources: &[Resource],
) -> Result<Outcome> {
    let holders: Vec<Resource> = resources.iter().filter(|r| r.has_tag(old)).cloned().collect();

    if holders.is_empty() {
        tracing::warn!("[replace-tag] No selected resource has tag {}", old);
        return Ok(Outcome::skipped("no resource holds the old tag"));
    }

    swap_tag(tagging, old, new, &references(&holders)).await?;
    tracing::info!(
        "[replace-tag] Tag {} replaced by {} on {} resource(s)",
        old,
        new,
        holders.len()
    );

    Ok(Outcome::Applied {
        resources: holders.len(),
        calls: 2,
    })
}

/// Detach `old` then attach `new`, batched across `targets`
pub(crate) async fn swap_tag(
    tagging: &dyn TaggingService,
    old: &str,
    new: &str,
    targets: &[ResourceRef],
) -> Result<()> {
    tagging.detach_tags(&[old.to_string()], targets).await?;
    tagging.attach_tags(&[new.to_string()], targets).await?;
    Ok(())
}

/// Rename every live tag named `old_name` to `new_name`, keeping its value
pub async fn replace_tag_name(
    tagging: &dyn TaggingService,
    old_name: &str,
    new_name: &str,
    resources: &[Resource],
) -> Result<Outcome> {
    let mut calls = 0;
    let mut touched = 0;

    for resource in resources {
        let live = tagging.list_tags(&resource.id).await?;
        let target = [resource.reference()];
        let mut renamed = false;

        for tag in &live {
            let (name, value) = split_tag(tag);
            if name != old_name {
                continue;
            }

            let replacement = join_tag(new_name, value);
            tracing::info!(
                "[replace-tag-name] {} -> {} on resource {}",
                tag,
                replacement,
                resource.name
            );
            swap_tag(tagging, tag, &replacement, &target).await?;
            calls += 2;
            renamed = true;
        }

        if renamed {
            touched += 1;
        }
    }

    if touched == 0 {
        tracing::warn!("[replace-tag-name] No selected resource has a '{}' tag", old_name);
    }

    Ok(Outcome::Applied {
        resources: touched,
        calls,
    })
}
