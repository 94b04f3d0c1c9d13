//! CLI configuration loading and merging.
//!
//! Configuration precedence:
//! 1. Environment variables (`KILN_*`)
//! 2. TOML config file (`--config` or `./kiln.toml`)
//! 3. Defaults
//!
//! Endpoint, API key, and the Azure scope have no defaults; a missing value
//! is reported with both the TOML field and the environment variable that
//! would supply it.

use kiln_client::{AzureScope, DataPlaneClient};
use kiln_workflow::{
    EnvTokenProvider, PollConfig, PromptTokenProvider, TokenProvider, WorkflowConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting `{field}` (set it in kiln.toml or via {env})")]
    Missing { field: &'static str, env: &'static str },
}

/// Raw configuration as read from file and environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Azure OpenAI resource endpoint, e.g. `https://my-res.openai.azure.com`.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Data-plane API key.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub subscription_id: Option<String>,

    #[serde(default)]
    pub resource_group: Option<String>,

    /// Cognitive Services account name.
    #[serde(default)]
    pub resource_name: Option<String>,

    /// Name for the model deployment.
    #[serde(default)]
    pub deployment_name: Option<String>,

    /// Folder holding the dataset files.
    #[serde(default)]
    pub dataset_folder: Option<PathBuf>,

    #[serde(default)]
    pub training_dataset: Option<String>,

    #[serde(default)]
    pub validation_dataset: Option<String>,

    /// Base model to fine-tune.
    #[serde(default)]
    pub base_model: Option<String>,

    /// Seconds to wait between upload and job submission.
    #[serde(default)]
    pub settle_delay_secs: Option<u64>,

    /// Seconds between status polls.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// Polls before giving up on a job or deployment.
    #[serde(default)]
    pub poll_max_attempts: Option<u32>,

    /// System prompt for the final inference call.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// User prompt for the final inference call.
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// Environment variables recognized as overrides, paired with the config
/// field they feed.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("KILN_ENDPOINT", "endpoint"),
    ("KILN_API_KEY", "api_key"),
    ("KILN_SUBSCRIPTION_ID", "subscription_id"),
    ("KILN_RESOURCE_GROUP", "resource_group"),
    ("KILN_RESOURCE_NAME", "resource_name"),
    ("KILN_DEPLOYMENT_NAME", "deployment_name"),
    ("KILN_DATASET_FOLDER", "dataset_folder"),
    ("KILN_TRAINING_DATASET", "training_dataset"),
    ("KILN_VALIDATION_DATASET", "validation_dataset"),
    ("KILN_BASE_MODEL", "base_model"),
];

impl KilnConfig {
    /// Default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from("kiln.toml")
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read { path: path.display().to_string(), source: e })?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse { path: path.display().to_string(), source: e })
    }

    /// Discover and load configuration.
    ///
    /// Reads the explicit `--config` path if given (an unreadable file is an
    /// error), otherwise `./kiln.toml` if present, otherwise starts from
    /// defaults. Environment variables override file values either way.
    pub fn discover_and_load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let local = Self::default_local_path();
                if local.exists() { Self::load_from_file(&local)? } else { Self::default() }
            }
        };
        config.apply_env_overrides(|var| std::env::var(var).ok());
        Ok(config)
    }

    /// Applies environment overrides through an injectable lookup.
    pub fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        for (var, field) in ENV_OVERRIDES {
            let Some(value) = get(var) else { continue };
            match *field {
                "endpoint" => self.endpoint = Some(value),
                "api_key" => self.api_key = Some(value),
                "subscription_id" => self.subscription_id = Some(value),
                "resource_group" => self.resource_group = Some(value),
                "resource_name" => self.resource_name = Some(value),
                "deployment_name" => self.deployment_name = Some(value),
                "dataset_folder" => self.dataset_folder = Some(PathBuf::from(value)),
                "training_dataset" => self.training_dataset = Some(value),
                "validation_dataset" => self.validation_dataset = Some(value),
                "base_model" => self.base_model = Some(value),
                _ => unreachable!("unmapped override {field}"),
            }
        }
    }

    /// Validates required settings and resolves defaults into the pieces
    /// the workflow needs.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::Missing { field: "endpoint", env: "KILN_ENDPOINT" })?;
        let api_key =
            self.api_key.ok_or(ConfigError::Missing { field: "api_key", env: "KILN_API_KEY" })?;
        let scope = AzureScope {
            subscription_id: self.subscription_id.ok_or(ConfigError::Missing {
                field: "subscription_id",
                env: "KILN_SUBSCRIPTION_ID",
            })?,
            resource_group: self.resource_group.ok_or(ConfigError::Missing {
                field: "resource_group",
                env: "KILN_RESOURCE_GROUP",
            })?,
            resource_name: self.resource_name.ok_or(ConfigError::Missing {
                field: "resource_name",
                env: "KILN_RESOURCE_NAME",
            })?,
        };

        let poll = PollConfig {
            interval: self
                .poll_interval_secs
                .map_or(PollConfig::default().interval, Duration::from_secs),
            max_attempts: self.poll_max_attempts.unwrap_or(PollConfig::default().max_attempts),
        };

        let workflow = WorkflowConfig {
            dataset_folder: self.dataset_folder.unwrap_or_else(|| PathBuf::from("Files")),
            training_dataset: self
                .training_dataset
                .unwrap_or_else(|| "recipe_training.jsonl".to_string()),
            validation_dataset: self
                .validation_dataset
                .unwrap_or_else(|| "recipe_validation.jsonl".to_string()),
            purpose: WorkflowConfig::DEFAULT_PURPOSE.to_string(),
            base_model: self
                .base_model
                .unwrap_or_else(|| WorkflowConfig::DEFAULT_BASE_MODEL.to_string()),
            deployment_name: self
                .deployment_name
                .unwrap_or_else(|| "ingredients_extractor".to_string()),
            scope,
            settle_delay: self
                .settle_delay_secs
                .map_or(WorkflowConfig::DEFAULT_SETTLE_DELAY, Duration::from_secs),
            training_poll: poll.clone(),
            deployment_poll: poll,
            system_prompt: self.system_prompt.unwrap_or_else(|| {
                "You are a helpful recipe assistant. You are to extract the generic \
                 ingredients from each of the recipes provided"
                    .to_string()
            }),
            user_prompt: self.user_prompt.unwrap_or_else(|| {
                "Title: Pancakes\n\nIngredients: [\"1 c. flour\", \"1 tsp. soda\", \
                 \"1 tsp. salt\", \"1 Tbsp. sugar\", \"1 egg\", \"3 Tbsp. margarine, melted\", \
                 \"1 c. buttermilk\"]\n\nGeneric ingredients: "
                    .to_string()
            }),
        };

        Ok(ResolvedConfig { endpoint, api_key, workflow })
    }
}

/// Validated configuration, ready to build clients from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub api_key: String,
    pub workflow: WorkflowConfig,
}

impl ResolvedConfig {
    pub fn data_plane_client(&self) -> DataPlaneClient {
        DataPlaneClient::new(&self.endpoint, &self.api_key)
    }

    /// Token provider for the management plane: the environment variable if
    /// set, an interactive prompt otherwise.
    pub fn token_provider(&self) -> Box<dyn TokenProvider> {
        if std::env::var(EnvTokenProvider::DEFAULT_VAR).is_ok() {
            Box::new(EnvTokenProvider::default())
        } else {
            Box::new(PromptTokenProvider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_toml() -> &'static str {
        r#"
            endpoint = "https://res.openai.azure.com"
            api_key = "key-1"
            subscription_id = "sub-1"
            resource_group = "rg-1"
            resource_name = "acct-1"
            deployment_name = "extractor"
            dataset_folder = "datasets"
            poll_interval_secs = 60
            poll_max_attempts = 10
        "#
    }

    #[test]
    fn parses_toml_and_applies_defaults() {
        let config: KilnConfig = toml::from_str(full_toml()).unwrap();
        let resolved = config.resolve().unwrap();

        assert_eq!(resolved.endpoint, "https://res.openai.azure.com");
        assert_eq!(resolved.workflow.base_model, "gpt-35-turbo-0613");
        assert_eq!(resolved.workflow.purpose, "fine-tune");
        assert_eq!(resolved.workflow.deployment_name, "extractor");
        assert_eq!(resolved.workflow.training_poll.interval, Duration::from_secs(60));
        assert_eq!(resolved.workflow.training_poll.max_attempts, 10);
        assert_eq!(resolved.workflow.settle_delay, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut config: KilnConfig = toml::from_str(full_toml()).unwrap();
        config
            .apply_env_overrides(|var| (var == "KILN_API_KEY").then(|| "key-from-env".to_string()));

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.api_key, "key-from-env");
        assert_eq!(resolved.endpoint, "https://res.openai.azure.com");
    }

    #[test]
    fn missing_required_setting_names_field_and_env_var() {
        let err = KilnConfig::default().resolve().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("endpoint"));
        assert!(message.contains("KILN_ENDPOINT"));
    }

    #[test]
    fn missing_scope_is_reported_after_credentials() {
        let mut config = KilnConfig::default();
        config.endpoint = Some("https://res.openai.azure.com".to_string());
        config.api_key = Some("key-1".to_string());

        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("KILN_SUBSCRIPTION_ID"));
    }

    #[test]
    fn load_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiln.toml");
        std::fs::write(&path, "endpoint = [not toml").unwrap();

        let err = KilnConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
