//! In-memory services for testing.
//!
//! `MockSearch` serves a fixed list of pages linked by synthetic cursors.
//! `MockTagging` keeps live tag state per resource, records every call and
//! can be told to fail listing for specific resources.

use super::http::ApiError;
use super::service::{SearchPage, SearchRequest, SearchService, TaggingService};
use crate::inventory::model::ResourceRef;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Mock search service.
pub struct MockSearch {
    pages: Vec<Vec<Value>>,
    trailing_cursor: bool,
    fail: bool,
    calls: RwLock<Vec<SearchRequest>>,
}

impl MockSearch {
    /// Creates a mock returning `pages` in order.
    pub fn new(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages,
            trailing_cursor: false,
            fail: false,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Hands out a cursor on the last page too.
    pub fn with_trailing_cursor(mut self) -> Self {
        self.trailing_cursor = true;
        self
    }

    /// Every search call fails.
    pub fn failing() -> Self {
        let mut mock = Self::new(Vec::new());
        mock.fail = true;
        mock
    }

    /// Gets recorded requests for test verification.
    pub async fn calls(&self) -> Vec<SearchRequest> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl SearchService for MockSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.calls.write().await.push(request.clone());

        if self.fail {
            return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE).into());
        }

        let index = match request.cursor.as_deref() {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("cursor-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| anyhow::anyhow!("Invalid search cursor: {}", cursor))?,
        };

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let has_more = index + 1 < self.pages.len();
        let next_cursor =
            (has_more || self.trailing_cursor).then(|| format!("cursor-{}", index + 1));

        Ok(SearchPage { items, next_cursor })
    }
}

/// A call recorded by [`MockTagging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCall {
    Attach { tags: Vec<String>, resources: Vec<String> },
    Detach { tags: Vec<String>, resources: Vec<String> },
    List(String),
    DeleteUnused,
}

impl TagCall {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Attach { .. } | Self::Detach { .. })
    }
}

/// Mock tagging service.
pub struct MockTagging {
    live: RwLock<HashMap<String, Vec<String>>>,
    failing_lists: HashSet<String>,
    fail_mutations: bool,
    unused: u64,
    calls: RwLock<Vec<TagCall>>,
}

impl Default for MockTagging {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTagging {
    pub fn new() -> Self {
        Self {
            live: RwLock::new(HashMap::new()),
            failing_lists: HashSet::new(),
            fail_mutations: false,
            unused: 0,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Seeds the live tag list of a resource.
    pub fn with_live_tags<I, S>(mut self, resource_id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.live
            .get_mut()
            .insert(resource_id.to_string(), tags.into_iter().map(Into::into).collect());
        self
    }

    /// Listing tags of `resource_id` fails.
    pub fn failing_list_for(mut self, resource_id: &str) -> Self {
        self.failing_lists.insert(resource_id.to_string());
        self
    }

    /// Every attach and detach fails.
    pub fn failing_mutations(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    /// Count reported by the delete-unused call.
    pub fn with_unused(mut self, count: u64) -> Self {
        self.unused = count;
        self
    }

    /// Gets recorded calls for test verification.
    pub async fn calls(&self) -> Vec<TagCall> {
        self.calls.read().await.clone()
    }

    pub async fn mutation_calls(&self) -> Vec<TagCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Current live tags of a resource.
    pub async fn tags_of(&self, resource_id: &str) -> Vec<String> {
        self.live
            .read()
            .await
            .get(resource_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn ids(resources: &[ResourceRef]) -> Vec<String> {
    resources.iter().map(|r| r.resource_id.clone()).collect()
}

#[async_trait]
impl TaggingService for MockTagging {
    async fn attach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        self.calls.write().await.push(TagCall::Attach {
            tags: tag_names.to_vec(),
            resources: ids(resources),
        });

        if self.fail_mutations {
            return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR).into());
        }

        let mut live = self.live.write().await;
        for resource in resources {
            let tags = live.entry(resource.resource_id.clone()).or_default();
            for tag in tag_names {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        Ok(())
    }

    async fn detach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        self.calls.write().await.push(TagCall::Detach {
            tags: tag_names.to_vec(),
            resources: ids(resources),
        });

        if self.fail_mutations {
            return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR).into());
        }

        let mut live = self.live.write().await;
        for resource in resources {
            if let Some(tags) = live.get_mut(&resource.resource_id) {
                tags.retain(|t| !tag_names.contains(t));
            }
        }
        Ok(())
    }

    async fn list_tags(&self, attached_to: &str) -> Result<Vec<String>> {
        self.calls
            .write()
            .await
            .push(TagCall::List(attached_to.to_string()));

        if self.failing_lists.contains(attached_to) {
            return Err(ApiError::new(StatusCode::TOO_MANY_REQUESTS).into());
        }

        Ok(self.tags_of(attached_to).await)
    }

    async fn delete_unused_tags(&self) -> Result<u64> {
        self.calls.write().await.push(TagCall::DeleteUnused);
        Ok(self.unused)
    }
}
