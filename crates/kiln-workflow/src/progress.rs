//! Progress events emitted while the workflow runs.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// The four stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Upload,
    Training,
    Deployment,
    Inference,
}

impl WorkflowStage {
    fn banner(self) -> &'static str {
        match self {
            Self::Upload => "UPLOADING FILES",
            Self::Training => "TRAINING CUSTOM MODEL",
            Self::Deployment => "DEPLOYING CUSTOM MODEL",
            Self::Inference => "USING CUSTOM MODEL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    StageStarted { stage: WorkflowStage },
    FileUploaded { name: String, file_id: String },
    JobSubmitted { job_id: String },
    TrainingPoll { status: String },
    ModelReady { model: String },
    DeploymentCreated { resource_id: String },
    DeploymentPoll { state: String },
    DeploymentReady { deployment: String },
    Answer { content: String },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: WorkflowEvent);
}

/// Prints human-readable progress lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::StageStarted { stage } => {
                println!("{}", "-".repeat(20));
                println!("***** {} *****", stage.banner());
            }
            WorkflowEvent::FileUploaded { name, file_id } => {
                println!("Uploaded {name}: {file_id}");
            }
            WorkflowEvent::JobSubmitted { job_id } => {
                println!("Training job id: {job_id}");
            }
            WorkflowEvent::TrainingPoll { status } => {
                println!("{}. Training job status: {status}", Local::now().format("%H:%M"));
            }
            WorkflowEvent::ModelReady { model } => {
                println!("Fine-tuned model name: {model}");
            }
            WorkflowEvent::DeploymentCreated { resource_id } => {
                println!("Deployment id: {resource_id}");
            }
            WorkflowEvent::DeploymentPoll { state } => {
                println!("{}. Deployment status: {state}", Local::now().format("%H:%M"));
            }
            WorkflowEvent::DeploymentReady { deployment } => {
                println!("Deployment ready: {deployment}");
            }
            WorkflowEvent::Answer { content } => {
                println!("AI message: {content}");
            }
        }
    }
}

/// Drops every event. For callers that only want the return value.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: WorkflowEvent) {}
}
