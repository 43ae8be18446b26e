//! Merge rules: defaults and environment overrides.

use crate::generation::request::{
    DEFAULT_MAX_TOKENS, DEFAULT_MIX_RATIO, DEFAULT_PRIMARY_MODEL, DEFAULT_SECONDARY_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_WARMUP_COUNT,
};
use crate::provider::{ProviderType, DEFAULT_REQUEST_TIMEOUT};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider.provider_type", ProviderType::Ollama.as_str())?
        .set_default("provider.timeout_secs", DEFAULT_REQUEST_TIMEOUT.as_secs())?
        .set_default("generation.primary_model", DEFAULT_PRIMARY_MODEL)?
        .set_default("generation.secondary_model", DEFAULT_SECONDARY_MODEL)?
        .set_default("generation.mix_ratio", DEFAULT_MIX_RATIO)?
        .set_default("generation.max_tokens", DEFAULT_MAX_TOKENS as u64)?
        .set_default("generation.warmup_count", DEFAULT_WARMUP_COUNT as u64)?
        .set_default("generation.temperature", f64::from(DEFAULT_TEMPERATURE))
}

/// Environment source, applied last: `TOKENMIX_GENERATION__MIX_RATIO=0.3`.
pub fn environment() -> Environment {
    Environment::with_prefix("TOKENMIX")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
