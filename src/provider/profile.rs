//! Provider configuration as read from config files and CLI flags.

use crate::error::GenerationError;
use crate::provider::{ModelProvider, DEFAULT_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
}

impl ProviderType {
    pub fn parse(type_str: &str) -> Result<Self, GenerationError> {
        match type_str {
            "ollama" => Ok(ProviderType::Ollama),
            "local" => Ok(ProviderType::LocalCustom),
            _ => Err(GenerationError::ConfigError(format!(
                "Invalid provider type: {}. Must be ollama or local",
                type_str
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::Ollama => "ollama",
            ProviderType::LocalCustom => "local",
        }
    }
}

/// Where tokens come from. Both backends are served by the same provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,

    /// Base URL (ollama) or full API endpoint (local)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout; a timeout aborts the run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_type() -> ProviderType {
    ProviderType::Ollama
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "endpoint must start with http:// or https://, got '{}'",
                    endpoint
                ));
            }
        }
        if self.provider_type == ProviderType::LocalCustom && self.endpoint.is_none() {
            return Err("local providers require an endpoint".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, GenerationError> {
        self.validate().map_err(GenerationError::ConfigError)?;
        match self.provider_type {
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                base_url: self.endpoint.clone(),
            }),
            ProviderType::LocalCustom => Ok(ModelProvider::LocalCustom {
                endpoint: self.endpoint.clone().unwrap_or_default(),
                api_key: self.api_key.clone(),
            }),
        }
    }
}
