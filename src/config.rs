//! Configuration Management
//!
//! Optional defaults read from `<config dir>/ibmtag/config.json`. Command line
//! flags win over environment variables, which win over the file.

use crate::ibm::auth::DEFAULT_IAM_URL;
use crate::ibm::client::{Endpoints, DEFAULT_SEARCH_URL, DEFAULT_TAGGING_URL};
use crate::inventory::{SearchOptions, DEFAULT_PAGE_LIMIT, DEFAULT_QUERY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tag types accepted by the tagging service
pub const TAG_TYPES: &[&str] = &["user", "access", "service"];

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub tagging_url: Option<String>,
    #[serde(default)]
    pub iam_url: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    /// `user`, `access` or `service`
    #[serde(default)]
    pub tag_type: Option<String>,
    /// Search query used to load the inventory
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page_limit: Option<u32>,
}

/// Values given on the command line, each overriding the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub account_id: Option<String>,
    pub tag_type: Option<String>,
    pub query: Option<String>,
    pub page_limit: Option<u32>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoints: Endpoints,
    pub iam_url: String,
    pub account_id: Option<String>,
    pub tag_type: Option<String>,
    pub search: SearchOptions,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ibmtag").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Merge with command line overrides and the environment
    pub fn resolve(&self, overrides: &Overrides) -> Result<Settings> {
        let endpoints = Endpoints {
            search_url: endpoint(
                "search",
                env_var("IBMTAG_SEARCH_URL").or_else(|| self.search_url.clone()),
                DEFAULT_SEARCH_URL,
            )?,
            tagging_url: endpoint(
                "tagging",
                env_var("IBMTAG_TAGGING_URL").or_else(|| self.tagging_url.clone()),
                DEFAULT_TAGGING_URL,
            )?,
        };
        let iam_url = endpoint(
            "IAM",
            env_var("IBMTAG_IAM_URL").or_else(|| self.iam_url.clone()),
            DEFAULT_IAM_URL,
        )?;

        let tag_type = overrides.tag_type.clone().or_else(|| self.tag_type.clone());
        if let Some(t) = &tag_type {
            if !TAG_TYPES.contains(&t.as_str()) {
                anyhow::bail!("Invalid tag type '{}' (expected one of: {})", t, TAG_TYPES.join(", "));
            }
        }

        let page_limit = overrides
            .page_limit
            .or(self.page_limit)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit == 0 {
            anyhow::bail!("Page limit must be greater than zero");
        }

        Ok(Settings {
            endpoints,
            iam_url,
            account_id: overrides.account_id.clone().or_else(|| self.account_id.clone()),
            tag_type,
            search: SearchOptions {
                query: overrides
                    .query
                    .clone()
                    .or_else(|| self.query.clone())
                    .unwrap_or_else(|| DEFAULT_QUERY.to_string()),
                page_limit,
            },
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Validate an endpoint base URL, falling back to `default`
fn endpoint(label: &str, value: Option<String>, default: &str) -> Result<String> {
    let value = value.unwrap_or_else(|| default.to_string());
    let parsed = url::Url::parse(&value)
        .with_context(|| format!("Invalid {} endpoint URL: {}", label, value))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Unsupported scheme for {} endpoint: {}", label, parsed.scheme());
    }

    Ok(value.trim_end_matches('/').to_string())
}
