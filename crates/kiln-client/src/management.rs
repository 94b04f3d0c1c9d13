//! Management-plane client: model deployments via Azure Resource Manager.
//!
//! Authenticated with a bearer token. Deployments are created with PUT
//! (create-or-update semantics) and polled by GETting the resource id the
//! PUT returned.

use crate::data_plane::{API_VERSION, parse_response};
use crate::error::ClientResult;
use crate::types::{
    Deployment, DeploymentModel, DeploymentRequest, DeploymentRequestProperties, DeploymentSku,
    DeploymentStatus,
};
use reqwest::Client;
use tracing::debug;

/// Default Azure Resource Manager base URL.
pub const ARM_BASE_URL: &str = "https://management.azure.com";

/// Identifies the Cognitive Services account that owns the deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureScope {
    pub subscription_id: String,
    pub resource_group: String,
    /// Cognitive Services account name.
    pub resource_name: String,
}

impl AzureScope {
    /// ARM path of a deployment under this scope, without the base URL.
    #[must_use]
    pub fn deployment_path(&self, deployment_name: &str) -> String {
        format!(
            "subscriptions/{}/resourceGroups/{}/providers/Microsoft.CognitiveServices/accounts/{}/deployments/{}",
            self.subscription_id, self.resource_group, self.resource_name, deployment_name
        )
    }
}

/// Client for the Azure management plane.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    /// ARM base URL, no trailing slash.
    base_url: String,
    /// Bearer token for ARM authentication.
    token: String,
    /// HTTP client for making requests.
    client: Client,
}

impl ManagementClient {
    /// Creates a client against the public ARM endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(ARM_BASE_URL, token)
    }

    /// Creates a client against a custom base URL (used in tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.base_url, path.trim_start_matches('/'), API_VERSION)
    }

    /// Creates (or updates) a deployment serving the given fine-tuned model.
    ///
    /// The SKU is fixed at Standard/1 and the model format at OpenAI
    /// version 1, matching what the fine-tuning data plane produces.
    pub async fn create_deployment(
        &self,
        scope: &AzureScope,
        deployment_name: &str,
        model_name: &str,
    ) -> ClientResult<Deployment> {
        debug!(deployment_name, model_name, "creating model deployment");

        let body = DeploymentRequest {
            sku: DeploymentSku::default(),
            properties: DeploymentRequestProperties { model: DeploymentModel::new(model_name) },
        };

        let response = self
            .client
            .put(self.url(&scope.deployment_path(deployment_name)))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Fetches the current snapshot of a deployment by its absolute ARM
    /// resource id. Idempotent read.
    pub async fn get_deployment(&self, resource_id: &str) -> ClientResult<DeploymentStatus> {
        let response =
            self.client.get(self.url(resource_id)).bearer_auth(&self.token).send().await?;

        parse_response(response).await
    }
}
