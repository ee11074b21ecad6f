//! Inventory records
//!
//! Canonical shapes for everything the search interface returns: addressable
//! resources that carry tags, and the structural containers (resource groups,
//! Cloud Foundry organizations and spaces) used only to resolve membership.

use serde::Serialize;
use serde_json::Value;

/// Separator between a tag's name and its value
pub const TAG_SEPARATOR: char = ':';

/// CRN segment holding the resource identifier
/// e.g. `crn:v1:bluemix:public:resource-controller::a/acct::resource-group:<id>`
const CRN_RESOURCE_SEGMENT: usize = 9;

/// Kind of structural container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    ResourceGroup,
    Organization,
    Space,
}

impl ContainerKind {
    /// Map a search record `type` to a container kind
    pub fn from_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            "resource-group" => Some(Self::ResourceGroup),
            "cf-organization" => Some(Self::Organization),
            "cf-space" => Some(Self::Space),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "resource-group",
            Self::Organization => "cf-organization",
            Self::Space => "cf-space",
        }
    }
}

/// A resource's membership references, at most one per container kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Containment {
    pub resource_group_id: Option<String>,
    pub organization_guid: Option<String>,
    pub space_guid: Option<String>,
}

impl Containment {
    /// The reference held for a given container kind
    pub fn reference(&self, kind: ContainerKind) -> Option<&str> {
        match kind {
            ContainerKind::ResourceGroup => self.resource_group_id.as_deref(),
            ContainerKind::Organization => self.organization_guid.as_deref(),
            ContainerKind::Space => self.space_guid.as_deref(),
        }
    }
}

/// Structural container (resource group, organization or space)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerGroup {
    /// `None` when no identifier could be derived from the record
    pub id: Option<String>,
    pub name: String,
    pub kind: ContainerKind,
}

/// Addressable, taggable resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// CRN, used as the opaque id for every tagging call
    pub id: String,
    pub name: String,
    pub resource_type: String,
    /// Current tags in the order the service reported them, without duplicates
    pub tags: Vec<String>,
    pub containment: Containment,
    pub region: Option<String>,
}

impl Resource {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            resource_type: String::new(),
            tags: Vec::new(),
            containment: Containment::default(),
            region: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = containment;
        self
    }

    /// Reference passed to tagging calls
    pub fn reference(&self) -> ResourceRef {
        ResourceRef {
            resource_id: self.id.clone(),
        }
    }

    /// Exact `name[:value]` match
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// First tag whose name equals `name`, value ignored
    pub fn tag_named(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| tag_name(t) == name)
            .map(|t| t.as_str())
    }

    pub fn has_tag_named(&self, name: &str) -> bool {
        self.tag_named(name).is_some()
    }
}

/// Resource reference as accepted by the tagging interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub resource_id: String,
}

/// A single search record, classified
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryRecord {
    Container(ContainerGroup),
    Resource(Resource),
}

impl From<&Value> for InventoryRecord {
    fn from(value: &Value) -> Self {
        let crn = str_field(value, "crn").unwrap_or_default();
        let name = str_field(value, "name").unwrap_or_default();
        let resource_type = str_field(value, "type").unwrap_or_default();

        if let Some(kind) = ContainerKind::from_type(&resource_type) {
            let id = crn_resource_id(&crn).or_else(|| nonempty(doc_field(value, "guid")));
            return Self::Container(ContainerGroup { id, name, kind });
        }

        let tags: Vec<String> = value
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let containment = Containment {
            resource_group_id: nonempty(
                doc_field(value, "resource_group_id").or_else(|| str_field(value, "resource_group_id")),
            ),
            organization_guid: nonempty(
                doc_field(value, "organization_guid").or_else(|| str_field(value, "organization_guid")),
            ),
            space_guid: nonempty(
                doc_field(value, "space_guid").or_else(|| str_field(value, "space_guid")),
            ),
        };

        let mut resource = Resource::new(&crn, &name).with_tags(tags).with_containment(containment);
        resource.resource_type = resource_type;
        resource.region = nonempty(str_field(value, "region"));
        Self::Resource(resource)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn doc_field(value: &Value, key: &str) -> Option<String> {
    value
        .get("doc")
        .and_then(|doc| doc.get(key))
        .and_then(|v| v.as_str())
        .map(String::from)
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Extract the resource segment of a CRN, if present and non-empty
pub fn crn_resource_id(crn: &str) -> Option<String> {
    crn.split(':')
        .nth(CRN_RESOURCE_SEGMENT)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Name part of a tag: everything before the first separator
pub fn tag_name(tag: &str) -> &str {
    split_tag(tag).0
}

/// Split `name[:value]` at the first separator; the value keeps any further colons
pub fn split_tag(tag: &str) -> (&str, Option<&str>) {
    match tag.split_once(TAG_SEPARATOR) {
        Some((name, value)) => (name, Some(value)),
        None => (tag, None),
    }
}

/// Build a tag from a name and an optional value
pub fn join_tag(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{}{}{}", name, TAG_SEPARATOR, value),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_tag_keeps_extra_colons_in_value() {
        assert_eq!(split_tag("env:prod"), ("env", Some("prod")));
        assert_eq!(split_tag("url:https://x"), ("url", Some("https://x")));
        assert_eq!(split_tag("bare"), ("bare", None));
        assert_eq!(split_tag("empty:"), ("empty", Some("")));
    }

    #[test]
    fn test_join_tag() {
        assert_eq!(join_tag("owner", Some("team:a")), "owner:team:a");
        assert_eq!(join_tag("owner", None), "owner");
    }

    #[test]
    fn test_crn_resource_id() {
        let crn = "crn:v1:bluemix:public:resource-controller::a/acct::resource-group:abc123";
        assert_eq!(crn_resource_id(crn), Some("abc123".to_string()));
        assert_eq!(crn_resource_id("crn:v1:short"), None);
        assert_eq!(
            crn_resource_id("crn:v1:bluemix:public:resource-controller::a/acct::resource-group:"),
            None
        );
    }

    #[test]
    fn test_record_classifies_resource_group() {
        let record = InventoryRecord::from(&json!({
            "name": "prod-rg",
            "type": "resource-group",
            "crn": "crn:v1:bluemix:public:resource-controller::a/acct::resource-group:rg1"
        }));
        assert_eq!(
            record,
            InventoryRecord::Container(ContainerGroup {
                id: Some("rg1".to_string()),
                name: "prod-rg".to_string(),
                kind: ContainerKind::ResourceGroup,
            })
        );
    }

    #[test]
    fn test_record_container_without_identifier() {
        let record = InventoryRecord::from(&json!({"name": "broken", "type": "cf-space"}));
        match record {
            InventoryRecord::Container(c) => {
                assert_eq!(c.kind, ContainerKind::Space);
                assert!(c.id.is_none());
            }
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[test]
    fn test_record_resource_projection() {
        let record = InventoryRecord::from(&json!({
            "name": "db1",
            "type": "resource-instance",
            "crn": "crn:v1:bluemix:public:databases-for-postgresql:eu-de:a/acct:inst1::",
            "region": "eu-de",
            "tags": ["env:prod", "env:prod", "team"],
            "doc": {"resource_group_id": "rg1", "space_guid": ""}
        }));
        let InventoryRecord::Resource(r) = record else {
            panic!("expected resource");
        };
        assert_eq!(r.name, "db1");
        assert_eq!(r.tags, vec!["env:prod", "team"]);
        assert_eq!(r.containment.resource_group_id.as_deref(), Some("rg1"));
        assert_eq!(r.containment.space_guid, None);
        assert_eq!(r.region.as_deref(), Some("eu-de"));
    }

    #[test]
    fn test_tag_lookup_by_name() {
        let r = Resource::new("crn:1", "db1").with_tags(["env:prod", "team:core"]);
        assert!(r.has_tag("env:prod"));
        assert!(!r.has_tag("env"));
        assert_eq!(r.tag_named("team"), Some("team:core"));
        assert!(!r.has_tag_named("owner"));
    }
}
