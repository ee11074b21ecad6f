//! Resource inventory
//!
//! Everything needed to turn a selector into the concrete set of resources a
//! run operates on.
//!
//! - [`model`] - resources, containers and tag helpers
//! - [`selector`] - the pure inclusion predicate
//! - [`loader`] - paginated search plus containment resolution

pub mod loader;
pub mod model;
pub mod selector;

pub use loader::{load_resources, SearchOptions, DEFAULT_PAGE_LIMIT, DEFAULT_QUERY};
pub use model::{
    join_tag, split_tag, tag_name, ContainerGroup, ContainerKind, Containment, Resource,
    ResourceRef,
};
pub use selector::{should_include, Named, Selector};
