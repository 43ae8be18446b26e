//! Logging System
//!
//! Structured logging using the `tracing` crate. Log output defaults to stderr so that
//! stdout carries only the generated completion.

use crate::error::GenerationError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Master switch (`--quiet` turns it off)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file"); defaults to the platform data dir
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!("Invalid log level: {}", self.level));
        }
        if self.format != "json" && self.format != "text" {
            return Err(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                self.format
            ));
        }
        parse_output_destination(&self.output).map(|_| ())
    }
}

/// Default log file: `<data dir>/tokenmix/tokenmix.log`.
pub fn default_log_file_path() -> PathBuf {
    ProjectDirs::from("", "", "tokenmix")
        .map(|dirs| dirs.data_local_dir().join("tokenmix.log"))
        .unwrap_or_else(|| PathBuf::from(".tokenmix/tokenmix.log"))
}

/// Pick the log file: CLI flag, then config, then the default location.
pub fn resolve_log_file_path(cli_file: Option<PathBuf>, config_file: Option<PathBuf>) -> PathBuf {
    cli_file
        .or(config_file)
        .unwrap_or_else(default_log_file_path)
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (TOKENMIX_LOG, TOKENMIX_LOG_FORMAT, TOKENMIX_LOG_OUTPUT)
/// 2. The given config (CLI flags are already merged into it)
/// 3. Defaults
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), GenerationError> {
    if config.map(|c| !c.enabled).unwrap_or(false) {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let use_color = config.map(|c| c.color).unwrap_or(true) && output != OutputDestination::File;

    let writer = match output {
        OutputDestination::Stdout => BoxMakeWriter::new(std::io::stdout),
        OutputDestination::Stderr => BoxMakeWriter::new(std::io::stderr),
        OutputDestination::File => {
            let path = config
                .and_then(|c| c.file.clone())
                .unwrap_or_else(default_log_file_path);
            BoxMakeWriter::new(Mutex::new(open_log_file(&path)?))
        }
    };

    let base_subscriber = Registry::default().with(filter);
    let result = if format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init()
    };

    result.map_err(|e| GenerationError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn open_log_file(path: &Path) -> Result<std::fs::File, GenerationError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            GenerationError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            GenerationError::ConfigError(format!("Failed to open log file {:?}: {}", path, e))
        })
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, GenerationError> {
    if let Ok(filter) = EnvFilter::try_from_env("TOKENMIX_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("warn");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(level);

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            filter = filter.add_directive(parse_directive(module, module_level)?);
        }
    }

    if let Ok(modules_str) = std::env::var("TOKENMIX_LOG_MODULES") {
        for module_spec in modules_str.split(',') {
            if let Some((module, module_level)) = module_spec.split_once('=') {
                filter = filter.add_directive(parse_directive(module.trim(), module_level.trim())?);
            }
        }
    }

    Ok(filter)
}

fn parse_directive(
    module: &str,
    level: &str,
) -> Result<tracing_subscriber::filter::Directive, GenerationError> {
    format!("{}={}", module, level)
        .parse()
        .map_err(|e| GenerationError::ConfigError(format!("Invalid log directive: {}", e)))
}

/// Determine output format from config or environment
fn determine_format(config: Option<&LoggingConfig>) -> Result<String, GenerationError> {
    if let Ok(format) = std::env::var("TOKENMIX_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(GenerationError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputDestination {
    Stdout,
    Stderr,
    File,
}

/// Determine output destination from config or environment
fn determine_output(config: Option<&LoggingConfig>) -> Result<OutputDestination, GenerationError> {
    let output = match std::env::var("TOKENMIX_LOG_OUTPUT") {
        Ok(output) => output,
        Err(_) => config
            .map(|c| c.output.clone())
            .unwrap_or_else(default_output),
    };
    parse_output_destination(&output).map_err(GenerationError::ConfigError)
}

fn parse_output_destination(output: &str) -> Result<OutputDestination, String> {
    match output {
        "stdout" => Ok(OutputDestination::Stdout),
        "stderr" => Ok(OutputDestination::Stderr),
        "file" => Ok(OutputDestination::File),
        _ => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
            output
        )),
    }
}
