//! The end-to-end fine-tuning pipeline.

use crate::credentials::TokenProvider;
use crate::error::{WorkflowError, WorkflowResult};
use crate::poll::{PollConfig, PollState, poll_until};
use crate::progress::{ProgressSink, WorkflowEvent, WorkflowStage};
use kiln_client::{
    ARM_BASE_URL, AzureScope, ChatMessage, DataPlaneClient, DeploymentStatus, FineTuneJob,
    ManagementClient,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Everything the pipeline needs beyond the two clients.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Folder holding both dataset files.
    pub dataset_folder: PathBuf,
    pub training_dataset: String,
    pub validation_dataset: String,
    /// Upload purpose; the fine-tuning API expects "fine-tune".
    pub purpose: String,
    /// Base model to fine-tune.
    pub base_model: String,
    /// Name under which the trained model is deployed.
    pub deployment_name: String,
    pub scope: AzureScope,
    /// Wait between the uploads and the job submission, giving the service
    /// time to ingest the files.
    pub settle_delay: Duration,
    pub training_poll: PollConfig,
    pub deployment_poll: PollConfig,
    /// System prompt for the final inference call.
    pub system_prompt: String,
    /// User prompt for the final inference call.
    pub user_prompt: String,
}

impl WorkflowConfig {
    /// Default base model for fine-tuning.
    pub const DEFAULT_BASE_MODEL: &'static str = "gpt-35-turbo-0613";
    /// Default upload purpose.
    pub const DEFAULT_PURPOSE: &'static str = "fine-tune";
    /// Default settle delay between upload and job submission.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(10);
}

/// Runs the pipeline: upload, train, deploy, infer.
pub struct FineTuneWorkflow {
    data_plane: DataPlaneClient,
    config: WorkflowConfig,
    token_provider: Box<dyn TokenProvider>,
    /// ARM base URL; overridable for tests.
    management_base_url: String,
}

impl FineTuneWorkflow {
    #[must_use]
    pub fn new(
        data_plane: DataPlaneClient,
        config: WorkflowConfig,
        token_provider: Box<dyn TokenProvider>,
    ) -> Self {
        Self { data_plane, config, token_provider, management_base_url: ARM_BASE_URL.to_string() }
    }

    /// Points the deployment stage at a custom ARM base URL (tests).
    #[must_use]
    pub fn with_management_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.management_base_url = base_url.into();
        self
    }

    /// Runs the whole pipeline and returns the model's answer to the
    /// configured prompt.
    ///
    /// Strictly sequential; every stage consumes the previous stage's
    /// output. Fails fast on terminal-failure states and bounds both
    /// polling loops by their configured attempt budgets.
    pub async fn run(&self, sink: &dyn ProgressSink) -> WorkflowResult<String> {
        let (training_file_id, validation_file_id) = self.upload_datasets(sink).await?;
        let model_name = self.train(sink, &training_file_id, &validation_file_id).await?;
        let deployment_name = self.deploy(sink, &model_name).await?;
        self.infer(sink, &deployment_name).await
    }

    async fn upload_datasets(&self, sink: &dyn ProgressSink) -> WorkflowResult<(String, String)> {
        sink.on_event(WorkflowEvent::StageStarted { stage: WorkflowStage::Upload });

        let training = self
            .data_plane
            .upload_file(
                &self.config.dataset_folder,
                &self.config.training_dataset,
                &self.config.purpose,
            )
            .await?;
        info!(file_id = %training.id, "training dataset uploaded");
        sink.on_event(WorkflowEvent::FileUploaded {
            name: self.config.training_dataset.clone(),
            file_id: training.id.clone(),
        });

        let validation = self
            .data_plane
            .upload_file(
                &self.config.dataset_folder,
                &self.config.validation_dataset,
                &self.config.purpose,
            )
            .await?;
        info!(file_id = %validation.id, "validation dataset uploaded");
        sink.on_event(WorkflowEvent::FileUploaded {
            name: self.config.validation_dataset.clone(),
            file_id: validation.id.clone(),
        });

        Ok((training.id, validation.id))
    }

    async fn train(
        &self,
        sink: &dyn ProgressSink,
        training_file_id: &str,
        validation_file_id: &str,
    ) -> WorkflowResult<String> {
        // Give the service time to ingest the uploads before referencing them.
        tokio::time::sleep(self.config.settle_delay).await;

        sink.on_event(WorkflowEvent::StageStarted { stage: WorkflowStage::Training });
        let job = self
            .data_plane
            .submit_fine_tune_job(&self.config.base_model, training_file_id, validation_file_id)
            .await?;
        info!(job_id = %job.id, "fine-tuning job submitted");
        sink.on_event(WorkflowEvent::JobSubmitted { job_id: job.id.clone() });

        let job_id = job.id.clone();
        let job = poll_until(
            &self.config.training_poll,
            "fine-tuning job",
            || {
                let job_id = job_id.clone();
                async move {
                    let snapshot = self.data_plane.get_fine_tune_job(&job_id).await?;
                    sink.on_event(WorkflowEvent::TrainingPoll { status: snapshot.status.clone() });
                    Ok(snapshot)
                }
            },
            classify_job,
        )
        .await?;

        let model_name = job.fine_tuned_model.ok_or(WorkflowError::MissingModelName)?;
        info!(model = %model_name, "fine-tuning succeeded");
        sink.on_event(WorkflowEvent::ModelReady { model: model_name.clone() });
        Ok(model_name)
    }

    async fn deploy(&self, sink: &dyn ProgressSink, model_name: &str) -> WorkflowResult<String> {
        sink.on_event(WorkflowEvent::StageStarted { stage: WorkflowStage::Deployment });

        let token = self.token_provider.bearer_token()?;
        let management = ManagementClient::with_base_url(&self.management_base_url, token);

        let deployment = management
            .create_deployment(&self.config.scope, &self.config.deployment_name, model_name)
            .await?;
        info!(resource_id = %deployment.id, "deployment created");
        sink.on_event(WorkflowEvent::DeploymentCreated { resource_id: deployment.id.clone() });

        let management = &management;
        let resource_id = deployment.id.clone();
        poll_until(
            &self.config.deployment_poll,
            "deployment",
            || {
                let resource_id = resource_id.clone();
                async move {
                    let snapshot = management.get_deployment(&resource_id).await?;
                    sink.on_event(WorkflowEvent::DeploymentPoll {
                        state: snapshot.properties.provisioning_state.clone(),
                    });
                    Ok(snapshot)
                }
            },
            classify_deployment,
        )
        .await?;

        info!(deployment = %self.config.deployment_name, "deployment provisioned");
        sink.on_event(WorkflowEvent::DeploymentReady {
            deployment: self.config.deployment_name.clone(),
        });
        Ok(self.config.deployment_name.clone())
    }

    async fn infer(&self, sink: &dyn ProgressSink, deployment_name: &str) -> WorkflowResult<String> {
        sink.on_event(WorkflowEvent::StageStarted { stage: WorkflowStage::Inference });

        let messages = vec![
            ChatMessage::system(&self.config.system_prompt),
            ChatMessage::user(&self.config.user_prompt),
        ];
        let answer = self.data_plane.chat_completion(deployment_name, messages).await?;
        sink.on_event(WorkflowEvent::Answer { content: answer.clone() });
        Ok(answer)
    }
}

fn classify_job(job: &FineTuneJob) -> PollState {
    if job.is_succeeded() {
        PollState::Succeeded
    } else if job.is_terminal_failure() {
        PollState::Failed(job.status.clone())
    } else {
        PollState::Pending
    }
}

fn classify_deployment(status: &DeploymentStatus) -> PollState {
    if status.is_succeeded() {
        PollState::Succeeded
    } else if status.is_terminal_failure() {
        PollState::Failed(status.properties.provisioning_state.clone())
    } else {
        PollState::Pending
    }
}
