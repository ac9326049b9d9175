// 🌐 Remote Service Boundary - analysis, name validation, reports, chat
//
// The service is authoritative for validity and rationale. Numbers shown to the
// user always come from the local calculators, whatever the service says.

use crate::error::{Error, Result};
use crate::profile::ClientProfile;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub full_name: String,
    pub birth_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    pub desired_outcome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub name: String,
    pub expression_number: u32,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: ClientProfile,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateNameRequest {
    pub suggested_name: String,
    pub client_profile: ClientProfile,
}

/// Authoritative verdict for one name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(default)]
    pub rationale: String,
}

impl ValidationOutcome {
    /// Local stand-in when the service could not be reached
    pub fn from_failure(error: &Error) -> Self {
        ValidationOutcome {
            is_valid: false,
            rationale: error.to_string(),
        }
    }
}

/// Snapshot taken when a name is confirmed. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedName {
    pub name: String,
    pub expression_number: u32,
    pub rationale: String,
    pub is_valid: bool,
    /// Local stamp only; the wire shape stays four fields
    #[serde(default = "chrono::Utc::now", skip_serializing)]
    pub confirmed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Pdf,
}

impl ReportFormat {
    fn path(&self) -> &'static str {
        match self {
            ReportFormat::Text => "/api/report",
            ReportFormat::Pdf => "/api/report/pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub client_profile: ClientProfile,
    pub confirmed_suggestions: Vec<ConfirmedName>,
}

/// Opaque document returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPayload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatMode {
    General,
    NameValidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub mode: ChatMode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_profile: Option<ClientProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

// ============================================================================
// SERVICE TRAIT
// ============================================================================

/// Everything the engine needs from the remote collaborator
#[async_trait]
pub trait NumerologyService: Send + Sync {
    /// Full profile plus ordered name suggestions
    async fn analyze(&self, request: &ProfileRequest) -> Result<ProfileResponse>;

    async fn validate_name(&self, request: &ValidateNameRequest) -> Result<ValidationOutcome>;

    async fn generate_report(
        &self,
        request: &ReportRequest,
        format: ReportFormat,
    ) -> Result<ReportPayload>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;
}

// ============================================================================
// HTTP IMPLEMENTATION
// ============================================================================

pub struct HttpNumerologyService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNumerologyService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpNumerologyService {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!("{} returned {}: {}", path, status, text)));
        }

        Ok(response)
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let bytes = self.post(path, body).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl NumerologyService for HttpNumerologyService {
    async fn analyze(&self, request: &ProfileRequest) -> Result<ProfileResponse> {
        self.post_json("/api/analyze", request).await
    }

    async fn validate_name(&self, request: &ValidateNameRequest) -> Result<ValidationOutcome> {
        self.post_json("/api/validate-name", request).await
    }

    async fn generate_report(
        &self,
        request: &ReportRequest,
        format: ReportFormat,
    ) -> Result<ReportPayload> {
        let response = self.post(format.path(), request).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(ReportPayload { content_type, bytes })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.post_json("/api/chat", request).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
