//! ibmtag - resolve IBM Cloud resources by selector and reconcile their tags
//!
//! - [`inventory`] - selector evaluation and paginated inventory loading
//! - [`ops`] - tag mutation and report handlers
//! - [`driver`] - load, dispatch, finish
//! - [`ibm`] - search and tagging services (HTTP adapters and mocks)
//! - [`config`] - configuration file and settings resolution
//! - [`output`] - report tables

pub mod config;
pub mod driver;
pub mod ibm;
pub mod inventory;
pub mod ops;
pub mod output;

/// Version injected at compile time via IBMTAG_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("IBMTAG_VERSION") {
    Some(v) => v,
    None => "dev",
};
