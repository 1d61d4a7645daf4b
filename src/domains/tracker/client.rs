//! Tracker REST client.
//!
//! [`TrackerApi`] is the seam the update pipeline talks through. The only
//! production implementation, [`YouTrackClient`], speaks the YouTrack REST API
//! and retries transient failures; rejected requests are returned as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::error::{TrackerError, TrackerResult};
use super::model::{BasicFields, IssueRef, validate_project};
use crate::core::config::{CredentialsConfig, TrackerConfig};

const BASE_DELAY_MS: u64 = 500;

/// Backoff stops doubling after this many retries (500ms * 2^6 = 32s).
const MAX_BACKOFF_EXPONENT: u32 = 6;

const ISSUE_FIELDS: &str = "id,idReadable,summary,description,project(shortName),\
     tags(name),customFields(name,value(name,localizedName,login,fullName,presentation,text,minutes))";

const PROJECT_FIELD_FIELDS: &str = "field(name,localizedName),\
     bundle(values(name,localizedName,ordinal,isResolved,archived))";

/// Operations the update pipeline needs from the tracker.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Replace summary and/or description in one call.
    async fn update_basic_fields(&self, issue: &IssueRef, fields: &BasicFields)
    -> TrackerResult<()>;

    /// Apply one command string to one issue.
    async fn apply_command(&self, issue: &IssueRef, query: &str) -> TrackerResult<()>;

    /// Raw custom field configuration of a project.
    async fn project_custom_fields(&self, project: &str) -> TrackerResult<Value>;

    /// Raw issue representation including custom fields.
    async fn get_issue(&self, issue: &IssueRef) -> TrackerResult<Value>;
}

/// HTTP client for the YouTrack REST API.
pub struct YouTrackClient {
    base_url: String,
    token: Option<String>,
    max_retries: u32,
    client: ReqwestClient,
}

impl YouTrackClient {
    /// Create a client from configuration.
    pub fn new(config: &TrackerConfig, credentials: &CredentialsConfig) -> TrackerResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| TrackerError::NotConfigured("MCP_YOUTRACK_URL is not set".into()))?;

        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: credentials.youtrack_token.clone(),
            max_retries: config.max_retries,
            client,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");

        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Send a request, retrying transient failures with exponential backoff.
    async fn execute(&self, req: RequestBuilder) -> TrackerResult<Value> {
        let mut attempt = 0;
        loop {
            let Some(current) = req.try_clone() else {
                return Self::send_once(req).await;
            };

            match Self::send_once(current).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = backoff_delay_ms(attempt);
                    attempt += 1;
                    warn!(
                        "Transient tracker failure (attempt {}/{}), retrying in {}ms: {}",
                        attempt,
                        self.max_retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                other => return other,
            }
        }
    }

    async fn send_once(req: RequestBuilder) -> TrackerResult<Value> {
        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!("Tracker responded {} ({} bytes)", status, bytes.len());

        if !status.is_success() {
            return Err(TrackerError::api(
                status.as_u16(),
                error_message(&bytes, status.canonical_reason().unwrap_or("error")),
            ));
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| TrackerError::invalid_response(format!("JSON parse error: {e}")))
    }
}

/// Delay before retry number `attempt + 1`.
fn backoff_delay_ms(attempt: u32) -> u64 {
    BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(attempt.min(MAX_BACKOFF_EXPONENT)))
}

/// Extract a readable message from a tracker error body.
fn error_message(body: &[u8], fallback: &str) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("error_description")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn issue_selector(issue: &IssueRef) -> Value {
    if issue.is_readable() {
        json!({ "idReadable": issue.id() })
    } else {
        json!({ "id": issue.id() })
    }
}

#[async_trait]
impl TrackerApi for YouTrackClient {
    #[instrument(skip(self, fields), fields(issue = %issue.id()))]
    async fn update_basic_fields(
        &self,
        issue: &IssueRef,
        fields: &BasicFields,
    ) -> TrackerResult<()> {
        let req = self
            .request(Method::POST, &format!("/api/issues/{}", issue.id()))
            .query(&[("fields", "id")])
            .json(fields);
        self.execute(req).await.map(|_| ())
    }

    #[instrument(skip(self), fields(issue = %issue.id()))]
    async fn apply_command(&self, issue: &IssueRef, query: &str) -> TrackerResult<()> {
        let body = json!({
            "query": query,
            "issues": [issue_selector(issue)],
        });
        let req = self.request(Method::POST, "/api/commands").json(&body);
        self.execute(req).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn project_custom_fields(&self, project: &str) -> TrackerResult<Value> {
        let project = validate_project(project)?;
        let req = self
            .request(
                Method::GET,
                &format!("/api/admin/projects/{project}/customFields"),
            )
            .query(&[("fields", PROJECT_FIELD_FIELDS)]);
        self.execute(req).await
    }

    #[instrument(skip(self), fields(issue = %issue.id()))]
    async fn get_issue(&self, issue: &IssueRef) -> TrackerResult<Value> {
        let req = self
            .request(Method::GET, &format!("/api/issues/{}", issue.id()))
            .query(&[("fields", ISSUE_FIELDS)]);
        self.execute(req).await
    }
}
