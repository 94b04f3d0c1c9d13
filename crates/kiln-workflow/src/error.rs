use kiln_client::ClientError;
use std::time::Duration;
use thiserror::Error;

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A job or deployment reached a terminal state other than success.
    #[error("{operation} reached terminal state \"{state}\"")]
    TerminalFailure { operation: String, state: String },

    /// The attempt budget ran out before a terminal state was observed.
    #[error("{operation} still pending after {attempts} polls (~{waited:?} waited)")]
    PollTimeout { operation: String, attempts: u32, waited: Duration },

    /// The job reported success but no fine-tuned model name.
    #[error("fine-tuning job succeeded but reported no model name")]
    MissingModelName,

    #[error("credential error: {0}")]
    Credential(String),
}
