//! Inventory Loader
//!
//! Pages through the search service, separates structural containers from
//! addressable resources and resolves which resources the selector picks,
//! either by name or through the containers they belong to.

use super::model::{ContainerGroup, ContainerKind, InventoryRecord, Resource};
use super::selector::Selector;
use crate::ibm::service::{SearchRequest, SearchService};
use anyhow::Result;
use serde_json::Value;

/// Default search query
pub const DEFAULT_QUERY: &str = "*";

/// Default page size
pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

/// Projection requested from the search service
pub const SEARCH_FIELDS: &[&str] = &[
    "crn",
    "name",
    "tags",
    "type",
    "region",
    "service_name",
    "doc.resource_group_id",
    "doc.organization_guid",
    "doc.space_guid",
    "doc.guid",
];

/// Search parameters for one load
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub page_limit: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Search results split by role
#[derive(Debug, Default)]
pub struct Partition {
    pub containers: Vec<ContainerGroup>,
    pub resources: Vec<Resource>,
}

/// Resolve the selector against the full inventory
pub async fn load_resources(
    search: &dyn SearchService,
    selector: &Selector,
    options: &SearchOptions,
) -> Result<Vec<Resource>> {
    if selector.is_empty() {
        tracing::info!("[load] No resources requested");
        return Ok(Vec::new());
    }

    tracing::info!("[load] Capturing structural containers and resource instances");
    let items = fetch_all(search, options).await?;
    tracing::info!("[load] Records returned: {}", items.len());

    let partition = partition(&items);
    let resources = resolve(partition, selector);
    tracing::info!("[load] Resources after filter: {}", resources.len());

    Ok(resources)
}

/// Fetch every page, strictly in sequence
pub async fn fetch_all(search: &dyn SearchService, options: &SearchOptions) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 0usize;

    loop {
        let request = SearchRequest {
            query: options.query.clone(),
            fields: SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
            limit: options.page_limit,
            cursor: cursor.take(),
        };

        let result = search.search(&request).await?;
        page += 1;
        tracing::debug!("[load] Page {} returned {} record(s)", page, result.items.len());

        // The service keeps handing out a cursor on the final, empty page
        let exhausted = result.items.is_empty();
        all_items.extend(result.items);

        match result.next_cursor {
            Some(next) if !exhausted => cursor = Some(next),
            _ => break,
        }
    }

    Ok(all_items)
}

/// Classify raw search records
pub fn partition(items: &[Value]) -> Partition {
    let mut partition = Partition::default();

    for item in items {
        match InventoryRecord::from(item) {
            InventoryRecord::Container(c) => partition.containers.push(c),
            InventoryRecord::Resource(r) if r.id.is_empty() => {
                tracing::debug!("[load] Skipping '{}': record has no CRN", r.name);
            }
            InventoryRecord::Resource(r) => partition.resources.push(r),
        }
    }

    partition
}

/// Keep the resources the selector picks directly or through a considered container
pub fn resolve(partition: Partition, selector: &Selector) -> Vec<Resource> {
    let total_containers = partition.containers.len();
    let considered: Vec<ContainerGroup> = partition
        .containers
        .into_iter()
        .filter(|c| selector.includes(c))
        .collect();

    for kind in [
        ContainerKind::ResourceGroup,
        ContainerKind::Organization,
        ContainerKind::Space,
    ] {
        tracing::info!(
            "[load] {} considered: {}",
            kind.as_str(),
            considered.iter().filter(|c| c.kind == kind).count()
        );
    }
    tracing::debug!(
        "[load] Containers returned: {}, considered: {}",
        total_containers,
        considered.len()
    );

    partition
        .resources
        .into_iter()
        .filter(|r| selector.includes(r) || contained_in_any(r, &considered))
        .collect()
}

/// True if any containment reference of `resource` points at a considered container
fn contained_in_any(resource: &Resource, considered: &[ContainerGroup]) -> bool {
    considered.iter().any(|container| {
        let Some(id) = container.id.as_deref() else {
            return false;
        };
        resource.containment.reference(container.kind) == Some(id)
    })
}
