//! Global Tagging
//!
//! Attach, detach, list and prune tags through the Global Tagging API, plus a
//! dry-run wrapper that keeps reads and drops writes.

use super::client::IbmClient;
use super::service::TaggingService;
use crate::inventory::model::ResourceRef;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Page size when listing tags attached to a resource
const LIST_TAGS_LIMIT: u64 = 1000;

/// Tagging service backed by the Global Tagging API
#[derive(Clone)]
pub struct GlobalTagging {
    client: IbmClient,
}

impl GlobalTagging {
    pub fn new(client: IbmClient) -> Self {
        Self { client }
    }

    async fn mutate(
        &self,
        action: &str,
        tag_names: &[String],
        resources: &[ResourceRef],
    ) -> Result<()> {
        let url = self.client.tagging_url(&format!("tags/{}", action), &[]);
        let body = json!({
            "resources": resources,
            "tag_names": tag_names,
        });

        let response = self
            .client
            .post(&url, Some(&body))
            .await
            .with_context(|| format!("Failed to {} tags", action))?;

        check_results(action, &response)
    }
}

/// The service answers 200 with per-resource `is_error` flags
fn check_results(action: &str, response: &Value) -> Result<()> {
    let failed: Vec<&str> = response
        .get("results")
        .and_then(|v| v.as_array())
        .map(|results| {
            results
                .iter()
                .filter(|r| r.get("is_error").and_then(|v| v.as_bool()).unwrap_or(false))
                .map(|r| r.get("resource_id").and_then(|v| v.as_str()).unwrap_or("-"))
                .collect()
        })
        .unwrap_or_default();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Failed to {} tags on {} resource(s): {}",
            action,
            failed.len(),
            failed.join(", ")
        ))
    }
}

#[async_trait]
impl TaggingService for GlobalTagging {
    async fn attach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        self.mutate("attach", tag_names, resources).await
    }

    async fn detach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        self.mutate("detach", tag_names, resources).await
    }

    async fn list_tags(&self, attached_to: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let url = self.client.tagging_url(
                "tags",
                &[
                    ("attached_to", attached_to.to_string()),
                    ("offset", offset.to_string()),
                    ("limit", LIST_TAGS_LIMIT.to_string()),
                ],
            );
            let response = self
                .client
                .get(&url)
                .await
                .with_context(|| format!("Failed to list tags attached to {}", attached_to))?;

            let items = response
                .get("items")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let total = response
                .get("total_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0);

            if items.is_empty() {
                break;
            }
            offset += items.len() as u64;
            names.extend(
                items
                    .iter()
                    .filter_map(|t| t.get("name").and_then(|v| v.as_str()).map(String::from)),
            );

            if offset >= total {
                break;
            }
        }

        Ok(names)
    }

    async fn delete_unused_tags(&self) -> Result<u64> {
        let url = self.client.tagging_url("tags", &[]);
        let response = self
            .client
            .delete(&url)
            .await
            .context("Failed to delete unused tags")?;

        Ok(response
            .get("total_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }
}

/// Logs mutations instead of issuing them; reads pass through
pub struct DryRunTagging<T> {
    inner: T,
}

impl<T: TaggingService> DryRunTagging<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: TaggingService> TaggingService for DryRunTagging<T> {
    async fn attach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        tracing::info!(
            "[dry-run] Would attach {:?} to {} resource(s)",
            tag_names,
            resources.len()
        );
        Ok(())
    }

    async fn detach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        tracing::info!(
            "[dry-run] Would detach {:?} from {} resource(s)",
            tag_names,
            resources.len()
        );
        Ok(())
    }

    async fn list_tags(&self, attached_to: &str) -> Result<Vec<String>> {
        self.inner.list_tags(attached_to).await
    }

    async fn delete_unused_tags(&self) -> Result<u64> {
        tracing::info!("[dry-run] Would delete all unused tags");
        Ok(0)
    }
}
