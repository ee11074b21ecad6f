//! IBM Cloud API interaction module
//!
//! # Module Structure
//!
//! - [`service`] - search and tagging interfaces the engine depends on
//! - [`auth`] - IAM API key exchange and bearer tokens
//! - [`client`] - authenticated client and URL builders
//! - [`http`] - HTTP utilities for REST API calls
//! - [`search`] - Global Search adapter
//! - [`tagging`] - Global Tagging adapter and dry-run wrapper
//! - [`mock`] - in-memory services for tests
//!
//! # Example
//!
//! ```ignore
//! use ibmtag::ibm::{auth::IbmCredentials, client::{Endpoints, IbmClient}, http::IbmHttpClient};
//!
//! let http = IbmHttpClient::default();
//! let creds = IbmCredentials::api_key("my-key", "https://iam.cloud.ibm.com", http.clone());
//! let client = IbmClient::new(creds, http, Endpoints::default());
//! let search = ibmtag::ibm::search::GlobalSearch::new(client.clone());
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod mock;
pub mod search;
pub mod service;
pub mod tagging;

pub use service::{SearchPage, SearchRequest, SearchService, TaggingService};
