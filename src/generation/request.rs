use crate::error::GenerationError;
use crate::schedule::{Backend, Schedule};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY_MODEL: &str = "gemma3:4b";
pub const DEFAULT_SECONDARY_MODEL: &str = "gemma3:270m";
pub const DEFAULT_MIX_RATIO: f64 = 0.5;
pub const DEFAULT_MAX_TOKENS: usize = 300;
pub const DEFAULT_WARMUP_COUNT: usize = 10;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One generation run's parameters. Validated before the loop starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub primary_backend: String,
    pub secondary_backend: String,
    pub mix_ratio: f64,
    pub warmup_count: usize,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        primary_backend: impl Into<String>,
        secondary_backend: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            primary_backend: primary_backend.into(),
            secondary_backend: secondary_backend.into(),
            mix_ratio: DEFAULT_MIX_RATIO,
            warmup_count: DEFAULT_WARMUP_COUNT,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_mix_ratio(mut self, mix_ratio: f64) -> Self {
        self.mix_ratio = mix_ratio;
        self
    }

    pub fn with_warmup_count(mut self, warmup_count: usize) -> Self {
        self.warmup_count = warmup_count;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Reject values the schedule and backends are not defined for.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.mix_ratio.is_finite() || !(0.0..=1.0).contains(&self.mix_ratio) {
            return Err(GenerationError::InvalidConfiguration(format!(
                "mix ratio must be within [0, 1], got {}",
                self.mix_ratio
            )));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(GenerationError::InvalidConfiguration(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        if self.primary_backend.trim().is_empty() {
            return Err(GenerationError::InvalidConfiguration(
                "primary backend cannot be empty".to_string(),
            ));
        }
        if self.secondary_backend.trim().is_empty() {
            return Err(GenerationError::InvalidConfiguration(
                "secondary backend cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.warmup_count, self.mix_ratio)
    }

    pub fn backend_id(&self, backend: Backend) -> &str {
        match backend {
            Backend::Primary => &self.primary_backend,
            Backend::Secondary => &self.secondary_backend,
        }
    }

    /// Fixed prompt prefix the generated text is appended to.
    pub fn context_prefix(&self) -> String {
        format!("Question: {}\n\nAnswer:", self.prompt)
    }
}
