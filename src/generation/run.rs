//! Generation loop: asks the schedule for a backend, pulls one token from the source,
//! and emits it. Strictly sequential; every call sees the full accumulated context.

use crate::error::GenerationError;
use crate::generation::request::GenerationRequest;
use crate::generation::sink::TokenSink;
use crate::provider::{TokenRequest, TokenSource};
use crate::schedule::{Backend, TokenOrigin};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One emitted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    pub position: usize,
    pub text: String,
    pub origin: TokenOrigin,
    /// Identifier of the backend that produced the token.
    pub backend: String,
    /// Set on the token occupying the last position the run can reach.
    pub is_terminal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxTokens,
    Done,
    EmptyToken,
    Cancelled,
}

/// Result of a completed (possibly early-stopped) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub text: String,
    pub tokens_produced: usize,
    pub primary_count: usize,
    pub secondary_count: usize,
    /// Warm-up tokens; already included in `primary_count`.
    pub warmup_count: usize,
    pub stop_reason: StopReason,
}

impl GenerationOutcome {
    /// Share of produced tokens that came from the secondary backend, in percent.
    pub fn secondary_percentage(&self) -> f64 {
        if self.tokens_produced == 0 {
            return 0.0;
        }
        self.secondary_count as f64 * 100.0 / self.tokens_produced as f64
    }
}

/// Cooperative cancellation, observed between iterations only.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run state. Created by `generate` and dropped when it returns.
struct GenerationState {
    context: String,
    prefix_len: usize,
    position: usize,
    primary_count: usize,
    secondary_count: usize,
    warmup_count: usize,
}

impl GenerationState {
    fn new(prefix: String) -> Self {
        Self {
            prefix_len: prefix.len(),
            context: prefix,
            position: 0,
            primary_count: 0,
            secondary_count: 0,
            warmup_count: 0,
        }
    }

    fn record(&mut self, token: &TokenResult) {
        self.context.push_str(&token.text);
        match token.origin {
            TokenOrigin::Initial => {
                self.warmup_count += 1;
                self.primary_count += 1;
            }
            TokenOrigin::Primary => self.primary_count += 1,
            TokenOrigin::Secondary => self.secondary_count += 1,
        }
    }

    fn finish(self, stop_reason: StopReason) -> GenerationOutcome {
        GenerationOutcome {
            text: self.context[self.prefix_len..].to_string(),
            tokens_produced: self.primary_count + self.secondary_count,
            primary_count: self.primary_count,
            secondary_count: self.secondary_count,
            warmup_count: self.warmup_count,
            stop_reason,
        }
    }
}

/// Drives a token source through the schedule of a request.
pub struct Generator<'a, S: TokenSource + ?Sized> {
    source: &'a S,
    cancellation: Option<CancellationFlag>,
}

impl<'a, S: TokenSource + ?Sized> Generator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub async fn generate<K: TokenSink + ?Sized>(
        &self,
        request: &GenerationRequest,
        sink: &mut K,
    ) -> Result<GenerationOutcome, GenerationError> {
        request.validate()?;

        info!(
            provider = self.source.provider_name(),
            primary = %request.primary_backend,
            secondary = %request.secondary_backend,
            mix_ratio = request.mix_ratio,
            warmup_count = request.warmup_count,
            max_tokens = request.max_tokens,
            "Generation started"
        );

        let schedule = request.schedule();
        let mut state = GenerationState::new(request.context_prefix());
        let mut stop_reason = StopReason::MaxTokens;

        while state.position < request.max_tokens {
            if self.is_cancelled() {
                stop_reason = StopReason::Cancelled;
                break;
            }

            let position = state.position;
            let backend = schedule.decide(position);
            let backend_id = request.backend_id(backend);

            let sample = self
                .source
                .next_token(TokenRequest {
                    prompt: &state.context,
                    backend: backend_id,
                    temperature: request.temperature,
                    num_tokens: 1,
                })
                .await
                .map_err(|source| {
                    warn!(position, backend = backend_id, error = %source, "Token source failed");
                    GenerationError::GenerationFailed {
                        position,
                        backend: backend_id.to_string(),
                        source,
                    }
                })?;

            if sample.done {
                stop_reason = StopReason::Done;
                break;
            }
            if sample.text.is_empty() {
                stop_reason = StopReason::EmptyToken;
                break;
            }

            let token = TokenResult {
                position,
                text: sample.text,
                origin: schedule.origin(position),
                backend: backend_id.to_string(),
                is_terminal: position + 1 == request.max_tokens,
            };
            debug!(
                position,
                backend = %token.backend,
                origin = ?token.origin,
                secondary = backend == Backend::Secondary,
                "Token generated"
            );
            sink.accept(&token);
            state.record(&token);
            state.position += 1;
        }

        let outcome = state.finish(stop_reason);
        info!(
            tokens_produced = outcome.tokens_produced,
            primary_count = outcome.primary_count,
            secondary_count = outcome.secondary_count,
            stop_reason = ?outcome.stop_reason,
            "Generation finished"
        );
        Ok(outcome)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(CancellationFlag::is_cancelled)
            .unwrap_or(false)
    }
}
