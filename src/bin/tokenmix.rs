//! Tokenmix CLI Binary
//!
//! Command-line interface for mixed-model token generation.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tokenmix::cli::{Cli, RunContext};
use tokenmix::config::ConfigLoader;
use tokenmix::logging::{init_logging, LoggingConfig};
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();
    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli, &working_dir);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Tokenmix starting");

    let context = match RunContext::new(&working_dir, cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", tokenmix::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli) {
        Ok(output) => {
            info!("Generation completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            eprintln!("{}", tokenmix::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, working_dir: &Path) -> LoggingConfig {
    let mut config = ConfigLoader::resolve(cli.config.as_deref(), working_dir)
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if cli.no_color {
        config.color = false;
    }

    if config.enabled && config.output == "file" {
        config.file = Some(tokenmix::logging::resolve_log_file_path(
            cli.log_file.clone(),
            config.file.clone(),
        ));
    } else if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
