//! CLI route: run context. Merges CLI flags over configuration, drives one generation run,
//! and hands results to presentation.

use crate::cli::parse::Cli;
use crate::cli::presentation::{
    format_run_header, format_summary_json, format_summary_text, ConsoleSink,
};
use crate::config::{ConfigLoader, ProviderConfig, ProviderType, TokenmixConfig};
use crate::error::GenerationError;
use crate::generation::{CancellationFlag, GenerationRequest, Generator, NullSink};
use crate::provider::ProviderFactory;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Exit status after a second Ctrl-C (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Runtime context for CLI execution: the resolved configuration.
pub struct RunContext {
    config: TokenmixConfig,
}

impl RunContext {
    /// Load configuration from `config_path`, or from the usual sources relative to `working_dir`.
    pub fn new(working_dir: &Path, config_path: Option<PathBuf>) -> Result<Self, GenerationError> {
        let config = ConfigLoader::resolve(config_path.as_deref(), working_dir)?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            GenerationError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        debug!(provider_type = ?config.provider.provider_type, "Configuration loaded");
        Ok(Self { config })
    }

    pub fn from_config(config: TokenmixConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenmixConfig {
        &self.config
    }

    /// Configured generation defaults with CLI overrides applied.
    pub fn build_request(&self, cli: &Cli, question: String) -> GenerationRequest {
        let mut request = self.config.generation.to_request(question);
        if let Some(primary) = &cli.primary {
            request.primary_backend = primary.clone();
        }
        if let Some(secondary) = &cli.secondary {
            request.secondary_backend = secondary.clone();
        }
        if let Some(mix_ratio) = cli.mix_ratio {
            request.mix_ratio = mix_ratio;
        }
        if let Some(max_tokens) = cli.max_tokens {
            request.max_tokens = max_tokens;
        }
        if let Some(warmup) = cli.warmup {
            request.warmup_count = warmup;
        }
        if let Some(temperature) = cli.temperature {
            request.temperature = temperature;
        }
        request
    }

    /// Configured provider with CLI overrides applied.
    pub fn provider_config(&self, cli: &Cli) -> Result<ProviderConfig, GenerationError> {
        let mut provider = self.config.provider.clone();
        if let Some(provider_type) = &cli.provider {
            provider.provider_type = ProviderType::parse(provider_type)?;
        }
        if let Some(endpoint) = &cli.endpoint {
            provider.endpoint = Some(endpoint.clone());
        }
        if let Some(api_key) = &cli.api_key {
            provider.api_key = Some(api_key.clone());
        }
        if let Some(timeout_secs) = cli.timeout_secs {
            provider.timeout_secs = timeout_secs;
        }
        Ok(provider)
    }

    /// Run one generation. Tokens stream to stdout as they arrive; the returned string is
    /// the summary to print afterwards.
    pub fn execute(&self, cli: &Cli) -> Result<String, GenerationError> {
        let json_output = match cli.format.as_str() {
            "text" => false,
            "json" => true,
            other => {
                return Err(GenerationError::InvalidConfiguration(format!(
                    "Invalid output format: {} (must be 'text' or 'json')",
                    other
                )))
            }
        };

        let question = match &cli.question {
            Some(question) => question.clone(),
            None => prompt_for_question()?,
        };
        let request = self.build_request(cli, question);
        request.validate()?;

        let provider_config = self.provider_config(cli)?;
        let model_provider = provider_config.to_model_provider()?;
        let client =
            ProviderFactory::create_client(&model_provider, provider_config.request_timeout())
                .map_err(|e| GenerationError::ConfigError(e.to_string()))?;
        info!(
            provider = provider_config.provider_type.as_str(),
            endpoint = provider_config.endpoint.as_deref().unwrap_or("default"),
            "Provider client created"
        );

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| GenerationError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        let cancellation = CancellationFlag::new();
        let flag = cancellation.clone();
        rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            flag.cancel();
            info!("Interrupt received; stopping after the current token");
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Second interrupt received; exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });

        let generator = Generator::new(client.as_ref()).with_cancellation(cancellation);

        if json_output {
            let outcome = rt.block_on(generator.generate(&request, &mut NullSink))?;
            return format_summary_json(&request, &outcome);
        }

        // `Stdout` locks per write; log events from runtime workers may share it.
        let color = !cli.no_color && self.config.logging.color;
        println!("\n{}\n", format_run_header(&request));
        let mut sink = ConsoleSink::new(std::io::stdout(), color);
        let outcome = rt.block_on(generator.generate(&request, &mut sink));
        sink.finish();
        let outcome = outcome?;

        Ok(format!("\n{}", format_summary_text(&outcome)))
    }
}

fn prompt_for_question() -> Result<String, GenerationError> {
    dialoguer::Input::<String>::new()
        .with_prompt("Question")
        .interact_text()
        .map_err(|e| GenerationError::InputError(format!("Failed to read question: {}", e)))
}
