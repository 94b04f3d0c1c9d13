//! Data-plane client: dataset uploads, fine-tuning jobs, chat completions.
//!
//! Authenticated with a static `api-key` header against the resource
//! endpoint (e.g. `https://my-resource.openai.azure.com/`).

use crate::error::{ClientError, ClientResult};
use crate::types::{
    ChatCompletion, ChatCompletionRequest, ChatMessage, FineTuneJob, FineTuneRequest, UploadedFile,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, error};

/// API version appended to every data-plane and management-plane request.
pub const API_VERSION: &str = "2023-10-01-preview";

/// Client for the Azure OpenAI data plane.
#[derive(Debug, Clone)]
pub struct DataPlaneClient {
    /// Resource endpoint, no trailing slash.
    endpoint: String,
    /// Value of the `api-key` header.
    api_key: String,
    /// HTTP client for making requests.
    client: Client,
}

impl DataPlaneClient {
    /// Creates a new client for the given resource endpoint and API key.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.endpoint, path, API_VERSION)
    }

    /// Uploads a dataset file for the given purpose ("fine-tune" in practice).
    ///
    /// The file is sent as a multipart form with a text `purpose` part and a
    /// `file` part carrying the original filename and an application/json
    /// content type (datasets are JSONL).
    ///
    /// # Errors
    /// `ClientError::Io` if the file cannot be read, `ClientError::Api` on a
    /// non-2xx response.
    pub async fn upload_file(
        &self,
        folder: &Path,
        file_name: &str,
        purpose: &str,
    ) -> ClientResult<UploadedFile> {
        let path = folder.join(file_name);
        debug!(path = %path.display(), purpose, "uploading dataset file");

        let bytes = tokio::fs::read(&path).await?;
        let file_part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;
        let form = Form::new().text("purpose", purpose.to_string()).part("file", file_part);

        let response = self
            .client
            .post(self.url("openai/files"))
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Submits a fine-tuning job referencing two previously uploaded files.
    ///
    /// The ids are passed through unvalidated; the API rejects bad ones.
    pub async fn submit_fine_tune_job(
        &self,
        base_model: &str,
        training_file_id: &str,
        validation_file_id: &str,
    ) -> ClientResult<FineTuneJob> {
        debug!(base_model, training_file_id, validation_file_id, "submitting fine-tuning job");

        let body = FineTuneRequest {
            model: base_model.to_string(),
            training_file: training_file_id.to_string(),
            validation_file: validation_file_id.to_string(),
        };

        let response = self
            .client
            .post(self.url("openai/fine_tuning/jobs"))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Fetches the current snapshot of a fine-tuning job. Idempotent read.
    pub async fn get_fine_tune_job(&self, job_id: &str) -> ClientResult<FineTuneJob> {
        let response = self
            .client
            .get(self.url(&format!("openai/fine_tuning/jobs/{job_id}")))
            .header("api-key", &self.api_key)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Sends a chat-completion request to a deployed model and returns the
    /// content of the first choice.
    ///
    /// # Errors
    /// `ClientError::EmptyChoices` if the response contains no choices.
    pub async fn chat_completion(
        &self,
        deployment_name: &str,
        messages: Vec<ChatMessage>,
    ) -> ClientResult<String> {
        debug!(deployment_name, message_count = messages.len(), "requesting chat completion");

        let body = ChatCompletionRequest { messages };
        let response = self
            .client
            .post(self.url(&format!("openai/deployments/{deployment_name}/chat/completions")))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let completion: ChatCompletion = parse_response(response).await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ClientError::EmptyChoices)
    }
}

/// Reads the body once, turning non-2xx responses into `ClientError::Api`
/// with the status code and raw error body.
pub(crate) async fn parse_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        error!(status = %status, body = %body, "API returned error status");
        return Err(ClientError::Api { status: status.as_u16(), body });
    }
    Ok(serde_json::from_str(&body)?)
}
