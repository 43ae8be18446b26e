//! Token Source Abstraction
//!
//! The generation loop pulls exactly one token per call from a `TokenSource`. Backends are
//! addressed by identifier (the model name) on every call, so one client serves both the
//! primary and the secondary backend. Implementations: local Ollama servers and
//! OpenAI-compatible completion endpoints.

use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod completions;
pub mod ollama;
pub mod profile;

pub use completions::CompletionsClient;
pub use ollama::OllamaClient;
pub use profile::{ProviderConfig, ProviderType};

/// Connection target of a token source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelProvider {
    Ollama {
        base_url: Option<String>, // Default: http://localhost:11434
    },
    LocalCustom {
        endpoint: String, // Full endpoint URL (e.g., http://localhost:8080/v1)
        api_key: Option<String>,
    },
}

/// One token request.
#[derive(Debug, Clone, Copy)]
pub struct TokenRequest<'a> {
    /// Full prompt: fixed prefix plus everything generated so far
    pub prompt: &'a str,
    /// Backend identifier (model name)
    pub backend: &'a str,
    pub temperature: f32,
    pub num_tokens: u32,
}

/// One generated token and whether the backend signalled completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSample {
    pub text: String,
    pub done: bool,
}

/// Token source trait
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Generate `request.num_tokens` tokens (the loop always asks for one)
    async fn next_token(&self, request: TokenRequest<'_>) -> Result<TokenSample, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    async fn next_token(&self, request: TokenRequest<'_>) -> Result<TokenSample, ProviderError> {
        (**self).next_token(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

// Helper function to map HTTP errors to ProviderError
pub(crate) fn map_http_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(error.to_string())
    } else if error.is_connect() {
        ProviderError::Transport(error.to_string())
    } else if let Some(status) = error.status() {
        ProviderError::Status {
            status: status.as_u16(),
            body: error.to_string(),
        }
    } else if error.is_decode() || error.is_body() {
        ProviderError::Protocol(error.to_string())
    } else {
        ProviderError::Transport(format!("HTTP error: {}", error))
    }
}

/// Turn a non-success response into a `ProviderError`, keeping the body for context.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(match status.as_u16() {
        404 => ProviderError::ModelNotFound(format!("{}: {}", model, body)),
        code => ProviderError::Status { status: code, body },
    })
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_provider_http_client(request_timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::ClientBuild(e.to_string()))
}

/// Provider factory for creating token sources
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
        request_timeout: Duration,
    ) -> Result<Box<dyn TokenSource>, ProviderError> {
        match provider {
            ModelProvider::Ollama { base_url } => Ok(Box::new(OllamaClient::new(
                base_url.clone(),
                request_timeout,
            )?)),
            ModelProvider::LocalCustom { endpoint, api_key } => Ok(Box::new(
                CompletionsClient::new(endpoint.clone(), api_key.clone(), request_timeout)?,
            )),
        }
    }
}
