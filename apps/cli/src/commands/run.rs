//! `kiln run` - execute the full fine-tuning pipeline.

use crate::config::KilnConfig;
use anyhow::Context;
use kiln_workflow::{FineTuneWorkflow, StdoutProgressSink};
use std::path::PathBuf;
use tracing::info;

pub async fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = KilnConfig::discover_and_load(config_path.as_deref())?;
    let resolved = config.resolve()?;

    info!(
        endpoint = %resolved.endpoint,
        deployment = %resolved.workflow.deployment_name,
        base_model = %resolved.workflow.base_model,
        "starting fine-tuning pipeline"
    );

    let workflow = FineTuneWorkflow::new(
        resolved.data_plane_client(),
        resolved.workflow.clone(),
        resolved.token_provider(),
    );

    let answer =
        workflow.run(&StdoutProgressSink).await.context("fine-tuning pipeline failed")?;

    info!(answer_len = answer.len(), "pipeline finished");
    Ok(())
}
