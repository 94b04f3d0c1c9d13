//! Wire types for the Azure OpenAI data and management planes.
//!
//! These are transient request/response records. Each poll deserializes a
//! fresh snapshot; nothing is mutated in place.

use serde::{Deserialize, Serialize};

/// Response from the file-upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
}

/// Snapshot of a fine-tuning job as reported by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FineTuneJob {
    pub id: String,
    /// Opaque lowercase status string ("pending", "running", "succeeded", ...).
    pub status: String,
    /// Name of the trained model; null until the job succeeds.
    #[serde(default)]
    pub fine_tuned_model: Option<String>,
}

impl FineTuneJob {
    /// Terminal success. Case-sensitive: the data plane reports lowercase.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    /// Terminal failure states that must stop polling.
    #[must_use]
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "cancelled")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FineTuneRequest {
    pub model: String,
    pub training_file: String,
    pub validation_file: String,
}

/// Response from the deployment PUT; `id` is the absolute ARM resource id.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    pub id: String,
}

/// Snapshot of a deployment resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeploymentStatus {
    pub properties: DeploymentProperties,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeploymentProperties {
    #[serde(rename = "provisioningState")]
    pub provisioning_state: String,
}

impl DeploymentStatus {
    /// Terminal success. ARM reports capitalized states ("Succeeded"),
    /// unlike the lowercase job statuses; both spellings are API
    /// conventions and are matched exactly.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.properties.provisioning_state == "Succeeded"
    }

    /// Terminal failure states that must stop polling. ARM spells
    /// "Canceled" with a single l.
    #[must_use]
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self.properties.provisioning_state.as_str(), "Failed" | "Canceled")
    }
}

/// Request body for the deployment PUT.
#[derive(Debug, Serialize)]
pub(crate) struct DeploymentRequest {
    pub sku: DeploymentSku,
    pub properties: DeploymentRequestProperties,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeploymentSku {
    pub name: String,
    pub capacity: u32,
}

impl Default for DeploymentSku {
    fn default() -> Self {
        Self { name: "Standard".to_string(), capacity: 1 }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeploymentRequestProperties {
    pub model: DeploymentModel,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeploymentModel {
    pub format: String,
    pub name: String,
    pub version: String,
}

impl DeploymentModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { format: "OpenAI".to_string(), name: name.into(), version: "1".to_string() }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
}

/// Response from the chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: Option<u32>,
    pub message: ChatMessage,
}
