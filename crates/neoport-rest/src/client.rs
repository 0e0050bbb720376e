//! HTTP transport and response validation for the Neo4j REST batch API.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::batch::BatchOp;

/// Content type required on batch POST bodies, and the content type the
/// server uses for structured error responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Default timeout applied to every request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from batch export and import operations.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server rejected request (status {status}): {errors}")]
    Server {
        status: u16,
        errors: serde_json::Value,
    },

    #[error("Unknown server error (status {status})")]
    UnknownServer { status: u16, body: String },

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RestError>;

/// Check whether the server accepted the preceding request.
///
/// Status 200 is success. On any other status, a JSON response surfaces
/// the server's `errors` field; a non-JSON response is reported with the
/// raw body attached for diagnostics. This is the sole point where
/// transport-level rejection becomes a domain error.
pub fn check_response(status: u16, content_type: Option<&str>, body: &str) -> Result<()> {
    if status == 200 {
        return Ok(());
    }

    let is_json = content_type
        .map(|ct| ct.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
        .unwrap_or(false);

    if is_json {
        let parsed: serde_json::Value = serde_json::from_str(body)?;
        let errors = parsed.get("errors").cloned().unwrap_or(parsed);
        Err(RestError::Server { status, errors })
    } else {
        Err(RestError::UnknownServer {
            status,
            body: body.to_string(),
        })
    }
}

/// Connection settings for a Neo4j REST endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the REST data endpoint, e.g. `http://localhost:7474/db/data/`.
    pub url: String,
    pub user: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474/db/data/".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
        }
    }
}

/// Authenticated client for the batch endpoint of a Neo4j server.
///
/// Clone is cheap (the inner reqwest client is an Arc).
#[derive(Debug, Clone)]
pub struct BatchClient {
    http: Client,
    config: ServerConfig,
}

impl BatchClient {
    pub fn new(config: ServerConfig) -> Self {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, config }
    }

    /// Fetch the server's capability directory and return its batch
    /// endpoint URL.
    ///
    /// The root GET returns a directory of REST endpoint URLs; batched
    /// reads and writes must be POSTed to the one named `batch`.
    pub async fn discover(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .send()
            .await?;

        let (status, content_type, body) = split_response(response).await?;
        check_response(status, content_type.as_deref(), &body)?;

        let directory: serde_json::Value = serde_json::from_str(&body)?;
        match directory.get("batch").and_then(|v| v.as_str()) {
            Some(batch_url) => {
                tracing::debug!(batch_url = %batch_url, "Discovered batch endpoint");
                Ok(batch_url.to_string())
            }
            None => Err(RestError::Config(format!(
                "server directory at {} has no `batch` endpoint",
                self.config.url
            ))),
        }
    }

    /// POST a list of batch operations and return the server's parsed
    /// JSON response.
    pub async fn post_batch(
        &self,
        batch_url: &str,
        ops: &[BatchOp],
    ) -> Result<serde_json::Value> {
        let payload = serde_json::to_string(ops)?;
        tracing::info!(url = %batch_url, ops = ops.len(), "Posting batch");

        let response = self
            .http
            .post(batch_url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload)
            .send()
            .await?;

        let (status, content_type, body) = split_response(response).await?;
        check_response(status, content_type.as_deref(), &body)?;

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull status, content type, and body out of a response so the body
/// is available for error diagnostics regardless of status.
async fn split_response(response: reqwest::Response) -> Result<(u16, Option<String>, String)> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await?;
    Ok((status, content_type, body))
}
