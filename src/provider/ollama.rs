//! Ollama token source (`/api/generate`, raw streaming mode).
//!
//! Each call streams from the server and keeps only the first NDJSON line, which carries
//! exactly one token. The rest of the stream is dropped with the response.

use crate::error::ProviderError;
use crate::provider::{
    build_provider_http_client, error_for_status, map_http_error, TokenRequest, TokenSample,
    TokenSource,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

/// Ollama provider client (local models)
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, request_timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        let client = build_provider_http_client(request_timeout)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TokenSource for OllamaClient {
    async fn next_token(&self, request: TokenRequest<'_>) -> Result<TokenSample, ProviderError> {
        let body = GenerateRequest {
            model: request.backend,
            prompt: request.prompt,
            raw: true,
            stream: true,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.num_tokens,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let mut response = error_for_status(response, request.backend).await?;

        let mut lines = LineBuffer::default();
        loop {
            if let Some(line) = lines.next_line() {
                return parse_chunk(&line);
            }
            match response.chunk().await.map_err(map_http_error)? {
                Some(bytes) => lines.extend(&bytes),
                None => break,
            }
        }

        match lines.finish() {
            Some(line) => parse_chunk(&line),
            None => {
                trace!(model = request.backend, "Empty stream treated as done");
                Ok(TokenSample {
                    text: String::new(),
                    done: true,
                })
            }
        }
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

fn parse_chunk(line: &str) -> Result<TokenSample, ProviderError> {
    let chunk: GenerateChunk = serde_json::from_str(line)
        .map_err(|e| ProviderError::Protocol(format!("Failed to parse stream line: {}", e)))?;
    if let Some(error) = chunk.error {
        return Err(ProviderError::Protocol(format!("Backend error: {}", error)));
    }
    Ok(TokenSample {
        text: chunk.response,
        done: chunk.done,
    })
}

/// Accumulates streamed bytes and yields complete, non-blank lines.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<String> {
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    /// Whatever is left once the stream has ended, if not blank.
    fn finish(mut self) -> Option<String> {
        if let Some(line) = self.next_line() {
            return Some(line);
        }
        let rest = String::from_utf8_lossy(&self.pending).trim().to_string();
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}
