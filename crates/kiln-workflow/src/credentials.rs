//! Credential providers for the management plane.
//!
//! The ARM bearer token is short-lived and not derivable from the data-plane
//! API key, so the workflow asks an injected provider for it right before
//! the deployment stage.

use crate::error::{WorkflowError, WorkflowResult};
use std::io::{BufRead, Write};

pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token for the Azure management plane.
    fn bearer_token(&self) -> WorkflowResult<String>;
}

/// Reads the token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    /// Default environment variable consulted for the management token.
    pub const DEFAULT_VAR: &'static str = "KILN_MGMT_TOKEN";

    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl TokenProvider for EnvTokenProvider {
    fn bearer_token(&self) -> WorkflowResult<String> {
        let token = std::env::var(&self.var)
            .map_err(|_| WorkflowError::Credential(format!("{} is not set", self.var)))?;
        non_empty(token.trim().to_string())
    }
}

/// Prompts for the token on standard input. Interactive use only.
#[derive(Debug, Default)]
pub struct PromptTokenProvider;

impl TokenProvider for PromptTokenProvider {
    fn bearer_token(&self) -> WorkflowResult<String> {
        print!("Enter a management-plane bearer token: ");
        std::io::stdout()
            .flush()
            .map_err(|e| WorkflowError::Credential(format!("failed to flush stdout: {e}")))?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| WorkflowError::Credential(format!("failed to read token: {e}")))?;
        non_empty(line.trim().to_string())
    }
}

/// Fixed token, used in tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(pub String);

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> WorkflowResult<String> {
        non_empty(self.0.clone())
    }
}

fn non_empty(token: String) -> WorkflowResult<String> {
    if token.is_empty() {
        return Err(WorkflowError::Credential("empty bearer token".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider("arm-token".to_string());
        assert_eq!(provider.bearer_token().unwrap(), "arm-token");
    }

    #[test]
    fn empty_token_is_rejected() {
        let provider = StaticTokenProvider(String::new());
        assert!(matches!(provider.bearer_token(), Err(WorkflowError::Credential(_))));
    }

    #[test]
    fn env_provider_names_the_variable_when_unset() {
        let provider = EnvTokenProvider::new("KILN_TEST_TOKEN_VAR_THAT_IS_UNSET");
        let err = provider.bearer_token().unwrap_err();
        assert!(err.to_string().contains("KILN_TEST_TOKEN_VAR_THAT_IS_UNSET"));
    }
}
