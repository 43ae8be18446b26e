//! Configuration System
//!
//! Layered configuration for provider, generation defaults and logging. Sources in
//! increasing precedence: built-in defaults, the global config file, the local
//! `tokenmix.toml` (or an explicit `--config` file), `TOKENMIX_*` environment variables.
//! CLI flags are applied on top by the caller.

use crate::generation::request::{
    GenerationRequest, DEFAULT_MAX_TOKENS, DEFAULT_MIX_RATIO, DEFAULT_PRIMARY_MODEL,
    DEFAULT_SECONDARY_MODEL, DEFAULT_TEMPERATURE, DEFAULT_WARMUP_COUNT,
};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub use crate::provider::{ProviderConfig, ProviderType};

mod loader;
mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod local_file;
}

pub use loader::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::local_file::LOCAL_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenmixConfig {
    /// Token source shared by both backends
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Generation defaults
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation defaults; every field can be overridden per run from the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    #[serde(default = "default_secondary_model")]
    pub secondary_model: String,

    /// Fraction of post-warm-up tokens produced by the secondary model
    #[serde(default = "default_mix_ratio")]
    pub mix_ratio: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Leading tokens always produced by the primary model
    #[serde(default = "default_warmup_count")]
    pub warmup_count: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_primary_model() -> String {
    DEFAULT_PRIMARY_MODEL.to_string()
}

fn default_secondary_model() -> String {
    DEFAULT_SECONDARY_MODEL.to_string()
}

fn default_mix_ratio() -> f64 {
    DEFAULT_MIX_RATIO
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_warmup_count() -> usize {
    DEFAULT_WARMUP_COUNT
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary_model: default_primary_model(),
            secondary_model: default_secondary_model(),
            mix_ratio: default_mix_ratio(),
            max_tokens: default_max_tokens(),
            warmup_count: default_warmup_count(),
            temperature: default_temperature(),
        }
    }
}

impl GenerationConfig {
    pub fn to_request(&self, prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest::new(
            prompt,
            self.primary_model.clone(),
            self.secondary_model.clone(),
        )
        .with_mix_ratio(self.mix_ratio)
        .with_max_tokens(self.max_tokens)
        .with_warmup_count(self.warmup_count)
        .with_temperature(self.temperature)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.to_request(String::new())
            .validate()
            .map_err(|e| e.to_string())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TokenmixConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
