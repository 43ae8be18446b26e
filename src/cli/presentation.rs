//! CLI presentation: console token sink, run header, and summary formatters.

use crate::error::GenerationError;
use crate::generation::{GenerationOutcome, GenerationRequest, StopReason, TokenResult, TokenSink};
use crate::schedule::TokenOrigin;
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::Write;
use tracing::warn;

/// Writes each token as it arrives. Warm-up tokens are light blue, secondary tokens red,
/// primary tokens uncolored.
pub struct ConsoleSink<W: Write> {
    writer: W,
    color: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self { writer, color }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Ends the token line and returns the writer.
    pub fn finish(mut self) -> W {
        if let Err(e) = writeln!(self.writer).and_then(|_| self.writer.flush()) {
            warn!(error = %e, "Failed to finish token output");
        }
        self.writer
    }
}

impl<W: Write> TokenSink for ConsoleSink<W> {
    fn accept(&mut self, token: &TokenResult) {
        let written = if self.color {
            match token.origin {
                TokenOrigin::Initial => write!(self.writer, "{}", token.text.bright_blue()),
                TokenOrigin::Secondary => write!(self.writer, "{}", token.text.red()),
                TokenOrigin::Primary => write!(self.writer, "{}", token.text),
            }
        } else {
            write!(self.writer, "{}", token.text)
        };
        if let Err(e) = written.and_then(|_| self.writer.flush()) {
            warn!(position = token.position, error = %e, "Failed to write token");
        }
    }
}

pub fn format_run_header(request: &GenerationRequest) -> String {
    format!(
        "[primary={}, secondary={}, ratio={}]",
        request.primary_backend, request.secondary_backend, request.mix_ratio
    )
}

pub fn format_summary_text(outcome: &GenerationOutcome) -> String {
    let mut line = format!(
        "Tokens: {} | Primary: {} | Secondary: {} ({:.0}%)",
        outcome.tokens_produced,
        outcome.primary_count,
        outcome.secondary_count,
        outcome.secondary_percentage()
    );
    if outcome.stop_reason == StopReason::Cancelled {
        line.push_str(" [cancelled]");
    }
    format!("---\n{}", line)
}

pub fn format_summary_json(
    request: &GenerationRequest,
    outcome: &GenerationOutcome,
) -> Result<String, GenerationError> {
    let out = json!({
        "primary": request.primary_backend,
        "secondary": request.secondary_backend,
        "mix_ratio": request.mix_ratio,
        "warmup_count": request.warmup_count,
        "max_tokens": request.max_tokens,
        "text": outcome.text,
        "tokens_produced": outcome.tokens_produced,
        "primary_count": outcome.primary_count,
        "secondary_count": outcome.secondary_count,
        "secondary_percentage": outcome.secondary_percentage(),
        "stop_reason": outcome.stop_reason,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| GenerationError::ConfigError(format!("Failed to encode summary: {}", e)))
}
