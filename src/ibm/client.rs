//! IBM Cloud Client
//!
//! Main client for the Global Search and Global Tagging APIs, combining
//! authentication and HTTP functionality.

use super::auth::IbmCredentials;
use super::http::IbmHttpClient;
use anyhow::Result;
use serde_json::Value;

/// Default Global Search endpoint
pub const DEFAULT_SEARCH_URL: &str = "https://api.global-search-tagging.cloud.ibm.com";

/// Default Global Tagging endpoint
pub const DEFAULT_TAGGING_URL: &str = "https://tags.global-search-tagging.cloud.ibm.com";

/// API base URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub search_url: String,
    pub tagging_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            tagging_url: DEFAULT_TAGGING_URL.to_string(),
        }
    }
}

/// Main IBM Cloud client
#[derive(Clone)]
pub struct IbmClient {
    pub credentials: IbmCredentials,
    pub http: IbmHttpClient,
    pub endpoints: Endpoints,
    /// Account scoping for search and tagging calls
    pub account_id: Option<String>,
    /// Tag type for tagging calls (`user`, `access`, `service`)
    pub tag_type: Option<String>,
}

impl IbmClient {
    pub fn new(credentials: IbmCredentials, http: IbmHttpClient, endpoints: Endpoints) -> Self {
        Self {
            credentials,
            http,
            endpoints,
            account_id: None,
            tag_type: None,
        }
    }

    pub fn with_account(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn with_tag_type(mut self, tag_type: Option<String>) -> Self {
        self.tag_type = tag_type;
        self
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.post(url, &token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // Global Search API helpers
    // =========================================================================

    /// Build Global Search API URL
    pub fn search_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut params = params.to_vec();
        if let Some(account_id) = &self.account_id {
            params.push(("account_id", account_id.clone()));
        }
        add_query_params(&format!("{}/v3/{}", trim(&self.endpoints.search_url), path), &params)
    }

    // =========================================================================
    // Global Tagging API helpers
    // =========================================================================

    /// Build Global Tagging API URL, scoped by account and tag type
    pub fn tagging_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut params = params.to_vec();
        if let Some(tag_type) = &self.tag_type {
            params.push(("tag_type", tag_type.clone()));
        }
        if let Some(account_id) = &self.account_id {
            params.push(("account_id", account_id.clone()));
        }
        add_query_params(&format!("{}/v3/{}", trim(&self.endpoints.tagging_url), path), &params)
    }
}

fn trim(base: &str) -> &str {
    base.trim_end_matches('/')
}

fn add_query_params(url: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", url, query)
}
