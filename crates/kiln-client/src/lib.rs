//! Kiln Client
//!
//! Typed REST client for the Azure OpenAI fine-tuning surface:
//! - Data plane: dataset uploads, fine-tuning jobs, chat completions
//! - Management plane (ARM): model deployments
//!
//! All operations return structured errors carrying the HTTP status and
//! error body instead of an empty sentinel, so callers can branch on
//! failure kind.

pub mod data_plane;
pub mod error;
pub mod management;
pub mod types;

pub use data_plane::{API_VERSION, DataPlaneClient};
pub use error::{ClientError, ClientResult};
pub use management::{AzureScope, ManagementClient, ARM_BASE_URL};
pub use types::{
    ChatChoice, ChatCompletion, ChatMessage, Deployment, DeploymentStatus, FineTuneJob,
    UploadedFile,
};
