//! Global Search
//!
//! `POST /v3/resources/search` with cursor based continuation.

use super::client::IbmClient;
use super::service::{SearchPage, SearchRequest, SearchService};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Search service backed by the Global Search API
#[derive(Clone)]
pub struct GlobalSearch {
    client: IbmClient,
}

impl GlobalSearch {
    pub fn new(client: IbmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchService for GlobalSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let url = self
            .client
            .search_url("resources/search", &[("limit", request.limit.to_string())]);

        let mut body = json!({
            "query": request.query,
            "fields": request.fields,
        });
        if let (Some(cursor), Value::Object(map)) = (&request.cursor, &mut body) {
            map.insert("search_cursor".to_string(), Value::String(cursor.clone()));
        }

        let response = self
            .client
            .post(&url, Some(&body))
            .await
            .context("Search request failed")?;

        Ok(parse_page(&response))
    }
}

fn parse_page(response: &Value) -> SearchPage {
    let items = response
        .get("items")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let next_cursor = response
        .get("search_cursor")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    SearchPage { items, next_cursor }
}
