//! Service interfaces
//!
//! The engine only talks to the search and tagging services through these
//! traits, so handlers can run against the HTTP adapters or the in-memory
//! mocks alike.

use crate::inventory::model::ResourceRef;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One search page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub fields: Vec<String>,
    pub limit: u32,
    pub cursor: Option<String>,
}

/// One search page
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<Value>,
    /// `None` on the last page
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}

#[async_trait]
pub trait TaggingService: Send + Sync {
    /// Attach every tag to every resource in one call
    async fn attach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()>;

    /// Detach every tag from every resource in one call
    async fn detach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()>;

    /// Live tag names attached to a resource
    async fn list_tags(&self, attached_to: &str) -> Result<Vec<String>>;

    /// Delete every tag with no attachment; returns how many were removed
    async fn delete_unused_tags(&self) -> Result<u64>;
}

#[async_trait]
impl<T: TaggingService + ?Sized> TaggingService for Arc<T> {
    async fn attach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        (**self).attach_tags(tag_names, resources).await
    }

    async fn detach_tags(&self, tag_names: &[String], resources: &[ResourceRef]) -> Result<()> {
        (**self).detach_tags(tag_names, resources).await
    }

    async fn list_tags(&self, attached_to: &str) -> Result<Vec<String>> {
        (**self).list_tags(attached_to).await
    }

    async fn delete_unused_tags(&self) -> Result<u64> {
        (**self).delete_unused_tags().await
    }
}
