//! OpenAI-compatible completions token source (`{endpoint}/completions`).
//!
//! Used for llama.cpp, vLLM and other local servers exposing the legacy completions API.

use crate::error::ProviderError;
use crate::provider::{
    build_provider_http_client, error_for_status, map_http_error, TokenRequest, TokenSample,
    TokenSource,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
    finish_reason: Option<String>,
}

/// Custom local provider client (OpenAI-compatible API)
pub struct CompletionsClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CompletionsClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = build_provider_http_client(request_timeout)?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl TokenSource for CompletionsClient {
    async fn next_token(&self, request: TokenRequest<'_>) -> Result<TokenSample, ProviderError> {
        let body = CompletionRequest {
            model: request.backend,
            prompt: request.prompt,
            max_tokens: request.num_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let url = format!("{}/completions", self.endpoint);
        let mut request_builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            request_builder =
                request_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request_builder
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = error_for_status(response, request.backend).await?;

        let text = response.text().await.map_err(map_http_error)?;
        parse_completion(&text)
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}

/// `done` only when the backend stopped without producing text; a token that arrives
/// together with a stop reason is still emitted.
fn parse_completion(body: &str) -> Result<TokenSample, ProviderError> {
    let completion: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Protocol(format!("Failed to parse response: {}", e)))?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Protocol("No choices in response".to_string()))?;
    let stopped = choice.finish_reason.as_deref() == Some("stop");
    Ok(TokenSample {
        done: stopped && choice.text.is_empty(),
        text: choice.text,
    })
}
