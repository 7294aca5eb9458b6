// tests for the openrouter client against a mock server

use sahayak::{Completion, Error, OpenRouter, OpenRouterConfig, UserContext};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenRouter {
    let mut config = OpenRouterConfig::new("sk-test");
    config.base_url = server.uri();
    OpenRouter::new(config).unwrap()
}

fn context() -> UserContext {
    UserContext {
        current_tracks: vec!["Hypertension".to_string()],
        recent_check_ins: vec![],
        age: Some(61),
    }
}

#[tokio::test]
async fn test_sends_request_and_reads_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("x-title", "Arogya Sahayak"))
        .and(body_partial_json(json!({
            "model": "qwen/qwen-2.5-72b-instruct",
            "max_tokens": 500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Keep it under 5g a day.\n" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete("Is salt bad for me?", &context())
        .await
        .unwrap();

    assert_eq!(reply, "Keep it under 5g a day.");
}

#[tokio::test]
async fn test_context_in_system_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .mount(&server)
        .await;

    client(&server).complete("hi", &context()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1], json!({ "role": "user", "content": "hi" }));
    let system = body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains(r#""currentTracks":["Hypertension"]"#));
    assert!(system.contains(r#""age":61"#));
}

#[tokio::test]
async fn test_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = client(&server).complete("hi", &context()).await.unwrap_err();
    match err {
        Error::Completion(msg) => assert!(msg.contains("429") && msg.contains("rate limited")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client(&server).complete("hi", &context()).await.unwrap_err();
    assert!(matches!(err, Error::Completion(_)));
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(client(&server).complete("hi", &context()).await.is_err());
}

#[test]
fn test_explicit_api_key_wins() {
    let config = OpenRouterConfig::from_env(Some("sk-given".to_string())).unwrap();
    assert_eq!(config.api_key, "sk-given");
    assert_eq!(config.temperature, 0.7);
}
