//! Kiln Workflow
//!
//! Orchestration of the fine-tuning pipeline:
//! - Generic bounded status polling (`poll_until`)
//! - Credential providers for the management plane (`TokenProvider`)
//! - Progress events (`WorkflowEvent`, `ProgressSink`)
//! - The end-to-end runner (`FineTuneWorkflow`)
//!
//! The pipeline is strictly sequential: upload datasets, train, deploy,
//! then ask the deployed model a single question. Each long-running remote
//! operation is gated by a polling loop that fails fast on terminal-failure
//! states and gives up after a configurable attempt budget.

pub mod credentials;
pub mod error;
pub mod poll;
pub mod progress;
pub mod workflow;

pub use credentials::{EnvTokenProvider, PromptTokenProvider, StaticTokenProvider, TokenProvider};
pub use error::{WorkflowError, WorkflowResult};
pub use poll::{PollConfig, PollState, poll_until};
pub use progress::{NullProgressSink, ProgressSink, StdoutProgressSink, WorkflowEvent, WorkflowStage};
pub use workflow::{FineTuneWorkflow, WorkflowConfig};
