//! End-to-end generation runs against a mock Ollama server

use futures::StreamExt;
use std::time::Duration;
use tokenmix::error::{GenerationError, ProviderError};
use tokenmix::generation::{
    GenerationRequest, Generator, NullSink, StopReason, TokenResult,
};
use tokenmix::provider::OllamaClient;
use tokenmix::schedule::TokenOrigin;

use crate::integration::test_utils::{unused_url, CannedResponse, MockServer};

const PREFIX: &str = "Question: Why is the sky blue?\n\nAnswer:";

fn request(max_tokens: usize, warmup: usize, ratio: f64) -> GenerationRequest {
    GenerationRequest::new("Why is the sky blue?", "big", "small")
        .with_max_tokens(max_tokens)
        .with_warmup_count(warmup)
        .with_mix_ratio(ratio)
}

fn client(server_url: String) -> OllamaClient {
    OllamaClient::new(Some(server_url), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_alternating_backends_over_http() {
    let server = MockServer::scripted(vec![
        CannedResponse::ollama_token("A", false),
        CannedResponse::ollama_token("B", false),
        CannedResponse::ollama_token("C", false),
        CannedResponse::ollama_token("D", false),
        CannedResponse::ollama_token("E", false),
        CannedResponse::ollama_token("", true),
    ]);
    let client = client(server.url());
    let mut tokens: Vec<TokenResult> = Vec::new();

    let outcome = Generator::new(&client)
        .generate(&request(5, 2, 0.5), &mut tokens)
        .await
        .unwrap();

    let origins: Vec<TokenOrigin> = tokens.iter().map(|t| t.origin).collect();
    assert_eq!(
        origins,
        vec![
            TokenOrigin::Initial,
            TokenOrigin::Initial,
            TokenOrigin::Secondary,
            TokenOrigin::Primary,
            TokenOrigin::Secondary,
        ]
    );
    assert_eq!(outcome.text, "ABCDE");
    assert_eq!(outcome.tokens_produced, 5);
    assert_eq!(outcome.secondary_count, 2);
    assert_eq!(outcome.primary_count, 3);
    assert_eq!(outcome.stop_reason, StopReason::MaxTokens);
    assert!(tokens[4].is_terminal);

    let requests = server.requests();
    assert_eq!(requests.len(), 5, "the sixth response is never requested");
    let models: Vec<&str> = requests
        .iter()
        .map(|r| r.body["model"].as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["big", "big", "small", "big", "small"]);

    for (i, req) in requests.iter().enumerate() {
        assert_eq!(req.path, "/api/generate");
        assert_eq!(req.body["raw"], true);
        assert_eq!(req.body["stream"], true);
        assert_eq!(req.body["options"]["num_predict"], 1);
        let expected_prompt = format!("{}{}", PREFIX, &"ABCDE"[..i]);
        assert_eq!(req.body["prompt"], expected_prompt.as_str());
    }
}

#[tokio::test]
async fn test_done_on_third_call_stops_cleanly() {
    let server = MockServer::scripted(vec![
        CannedResponse::ollama_token("one", false),
        CannedResponse::ollama_token(" two", false),
        CannedResponse::ollama_token("", true),
    ]);
    let client = client(server.url());

    let outcome = Generator::new(&client)
        .generate(&request(10, 1, 0.5), &mut NullSink)
        .await
        .unwrap();

    assert_eq!(outcome.tokens_produced, 2);
    assert_eq!(outcome.text, "one two");
    assert_eq!(outcome.stop_reason, StopReason::Done);
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_server_error_on_fourth_call_is_fatal() {
    let server = MockServer::scripted(vec![
        CannedResponse::ollama_token("a", false),
        CannedResponse::ollama_token("b", false),
        CannedResponse::ollama_token("c", false),
        CannedResponse::status(500, r#"{"error":"model crashed"}"#),
    ]);
    let client = client(server.url());
    let mut tokens: Vec<TokenResult> = Vec::new();

    let result = Generator::new(&client)
        .generate(&request(10, 2, 0.5), &mut tokens)
        .await;

    match result {
        Err(GenerationError::GenerationFailed {
            position,
            backend,
            source: ProviderError::Status { status, .. },
        }) => {
            assert_eq!(position, 3);
            assert_eq!(backend, "big");
            assert_eq!(status, 500);
        }
        other => panic!("expected GenerationFailed, got {:?}", other),
    }
    assert_eq!(tokens.len(), 3, "tokens before the failure were already streamed");
}

#[tokio::test]
async fn test_unreachable_server_fails_first_token() {
    let client = client(unused_url());
    let result = Generator::new(&client)
        .generate(&request(5, 2, 0.5), &mut NullSink)
        .await;

    assert!(matches!(
        result,
        Err(GenerationError::GenerationFailed {
            position: 0,
            source: ProviderError::Transport(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_zero_max_tokens_makes_no_requests() {
    let server = MockServer::scripted(vec![CannedResponse::ollama_token("x", false)]);
    let client = client(server.url());

    let outcome = Generator::new(&client)
        .generate(&request(0, 2, 0.5), &mut NullSink)
        .await
        .unwrap();

    assert_eq!(outcome.text, "");
    assert_eq!(outcome.tokens_produced, 0);
    assert_eq!(outcome.secondary_percentage(), 0.0);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_tokens_stream_through_channel() {
    let server = MockServer::scripted(vec![
        CannedResponse::ollama_token("x", false),
        CannedResponse::ollama_token("y", false),
        CannedResponse::ollama_token("z", false),
    ]);
    let client = client(server.url());
    let (mut sender, receiver) = futures::channel::mpsc::unbounded::<TokenResult>();

    let outcome = Generator::new(&client)
        .generate(&request(3, 0, 1.0), &mut sender)
        .await
        .unwrap();
    drop(sender);

    let streamed: Vec<TokenResult> = receiver.collect().await;
    assert_eq!(streamed.len(), 3);
    assert!(streamed.iter().all(|t| t.origin == TokenOrigin::Secondary));
    assert!(streamed.iter().all(|t| t.backend == "small"));
    assert_eq!(outcome.secondary_count, 3);
}
