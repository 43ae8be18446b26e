//! CLI parse: clap types for tokenmix. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// tokenmix - generate text by switching between a large and a small model token by token
#[derive(Parser, Debug)]
#[command(name = "tokenmix", version)]
#[command(about = "Generate text using a mix of large and small models")]
#[command(after_help = "Examples:
  tokenmix \"What is AI?\"
  tokenmix \"Explain gravity\" --mix-ratio 0.7
  tokenmix \"Write a poem\" --primary gemma3:4b --secondary gemma3:270m")]
pub struct Cli {
    /// Your question (prompted for when omitted)
    pub question: Option<String>,

    /// Primary (large) model; default from config or gemma3:4b
    #[arg(long, visible_alias = "big")]
    pub primary: Option<String>,

    /// Secondary (small) model; default from config or gemma3:270m
    #[arg(long, visible_alias = "small")]
    pub secondary: Option<String>,

    /// Fraction of post-warm-up tokens from the secondary model (0.0-1.0, default: 0.5)
    #[arg(
        long = "mix-ratio",
        short = 'r',
        visible_alias = "small-ratio",
        allow_negative_numbers = true
    )]
    pub mix_ratio: Option<f64>,

    /// Maximum tokens to generate (default: 300)
    #[arg(long, short = 'm')]
    pub max_tokens: Option<usize>,

    /// Leading tokens always generated by the primary model (default: 10)
    #[arg(long, visible_alias = "min-tokens")]
    pub warmup: Option<usize>,

    /// Sampling temperature (default: 0.7)
    #[arg(long, short = 't', allow_negative_numbers = true)]
    pub temperature: Option<f32>,

    /// Provider type (ollama, local)
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider base URL (ollama) or API endpoint (local)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for local OpenAI-compatible endpoints
    #[arg(long)]
    pub api_key: Option<String>,

    /// Per-token request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Summary format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Disable token coloring
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
