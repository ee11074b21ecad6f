//! IBM Cloud Authentication
//!
//! Exchanges an IAM API key for a bearer token, or uses an already-issued
//! bearer token as-is.

use super::http::IbmHttpClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default IAM endpoint
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

/// Grant type for API key exchange
const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Token TTL when IAM does not report one (IAM issues 60 minute tokens)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["IBMCLOUD_API_KEY", "IC_API_KEY"];

/// Credentials holder with token caching
#[derive(Clone)]
pub enum IbmCredentials {
    /// IAM API key, exchanged on demand
    ApiKey(Arc<ApiKeyCredentials>),
    /// Pre-issued bearer token
    Bearer(String),
}

pub struct ApiKeyCredentials {
    api_key: String,
    iam_url: String,
    http: IbmHttpClient,
    token_cache: RwLock<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl IbmCredentials {
    /// Credentials backed by an IAM API key
    pub fn api_key(api_key: &str, iam_url: &str, http: IbmHttpClient) -> Self {
        Self::ApiKey(Arc::new(ApiKeyCredentials {
            api_key: api_key.to_string(),
            iam_url: iam_url.trim_end_matches('/').to_string(),
            http,
            token_cache: RwLock::new(None),
        }))
    }

    pub fn bearer(token: &str) -> Self {
        Self::Bearer(token.trim_start_matches("Bearer ").to_string())
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        match self {
            Self::Bearer(token) => Ok(token.clone()),
            Self::ApiKey(creds) => creds.get_token().await,
        }
    }
}

impl ApiKeyCredentials {
    async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let url = format!("{}/identity/token", self.iam_url);
        let form = [
            ("grant_type", APIKEY_GRANT_TYPE),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self
            .http
            .post_form(&url, &form)
            .await
            .context("Failed to exchange API key for an IAM token")?;

        let token = response
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("IAM response did not contain an access token"))?
            .to_string();

        let ttl = response
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        *self.token_cache.write().await = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }
}

/// Read the API key from the environment
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
