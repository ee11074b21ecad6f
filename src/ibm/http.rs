//! HTTP utilities for IBM Cloud REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Non-success HTTP status returned by an IBM Cloud endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("API request failed: {status}")]
pub struct ApiError {
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }
}

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for IBM Cloud API calls
#[derive(Clone)]
pub struct IbmHttpClient {
    client: Client,
}

impl IbmHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("ibmtag/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let request = self.client.get(url).bearer_auth(token);
        self.send(request).await
    }

    /// Make a POST request with an optional JSON body
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        self.send(request).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        let request = self.client.delete(url).bearer_auth(token);
        self.send(request).await
    }

    /// POST a url-encoded form without bearer auth (token exchange)
    pub async fn post_form<T: Serialize + ?Sized>(&self, url: &str, form: &T) -> Result<Value> {
        tracing::debug!("POST {} (form)", url);
        let request = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let request_id = Uuid::new_v4();

        let response = request
            .header("X-Request-ID", request_id.to_string())
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {} (request {})",
                status,
                sanitize_for_log(&body),
                request_id
            );
            return Err(ApiError::new(status).into());
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

impl Default for IbmHttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT).expect("Failed to create default HTTP client")
    }
}

/// Format an API error for display
/// Sanitizes error messages to avoid leaking sensitive API details
pub fn format_api_error(error: &anyhow::Error) -> String {
    let status = error
        .chain()
        .find_map(|e| e.downcast_ref::<ApiError>())
        .map(|e| e.status);

    if let Some(status) = status {
        return match status.as_u16() {
            403 => "Permission denied. Check the IAM access policies of the API key.",
            401 => "Authentication failed. Check the API key or bearer token.",
            404 => "Resource not found.",
            429 => "Rate limit exceeded. Please try again later.",
            400 => "Invalid request. Check your parameters.",
            500 | 503 => "IBM Cloud service temporarily unavailable. Please try again.",
            409 => "Conflict. The tag may be in use or already exist.",
            _ => "Request failed. Check your network connection and try again.",
        }
        .to_string();
    }

    // Context layers may carry CRNs and account ids; show the root cause only
    let root = error.root_cause().to_string();
    let sanitized = root
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(120)
        .collect::<String>();

    if sanitized.len() < root.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
