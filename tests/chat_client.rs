//! Provider adapters against a mock HTTP server.

use chatchef::llm::chat::gemini::GeminiChatClient;
use chatchef::llm::chat::openai::OpenAIChatClient;
use chatchef::llm::chat::{ build_http_client, ChatClient };
use chatchef::llm::{ ChatReply, LlmConfig, LlmType, ReplyErrorKind };
use std::time::Duration;
use wiremock::matchers::{ body_json, header, method, path, query_param };
use wiremock::{ Mock, MockServer, ResponseTemplate };

fn gemini(server: &MockServer, timeout: Option<Duration>) -> GeminiChatClient {
    let config = LlmConfig {
        llm_type: LlmType::Gemini,
        api_key: Some("TEST_KEY".into()),
        completion_model: Some("gemini-test".into()),
        base_url: Some(server.uri()),
        timeout,
    };
    GeminiChatClient::from_config(&config).unwrap()
}

#[tokio::test]
async fn gemini_sends_literal_prompt_and_reads_first_candidate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(query_param("key", "TEST_KEY"))
        .and(body_json(serde_json::json!({ "contents": [{ "parts": [{ "text": "pasta" }] }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Salt the water generously." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gemini(&server, None).complete("pasta").await;
    assert_eq!(reply, ChatReply::Success { text: "Salt the water generously.".into() });
}

#[tokio::test]
async fn gemini_unexpected_shape_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    assert_eq!(gemini(&server, None).complete("pasta").await, ChatReply::Empty);
}

#[tokio::test]
async fn gemini_error_status_and_bad_body_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    assert_eq!(
        gemini(&server, None).complete("pasta").await,
        ChatReply::Error { kind: ReplyErrorKind::Status(503) }
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    assert_eq!(
        gemini(&server, None).complete("pasta").await,
        ChatReply::Error { kind: ReplyErrorKind::Parse }
    );
}

#[tokio::test]
async fn gemini_error_status_with_json_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let reply = gemini(&server, None).complete("pasta").await;
    assert_eq!(reply, ChatReply::Empty);
    assert_eq!(reply.into_text(), chatchef::llm::NO_ANSWER_TEXT);
}

#[tokio::test]
async fn gemini_slow_reply_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(serde_json::json!({}))
        )
        .mount(&server)
        .await;

    let reply = gemini(&server, Some(Duration::from_millis(200))).complete("pasta").await;
    assert_eq!(reply, ChatReply::Error { kind: ReplyErrorKind::Timeout });
}

#[tokio::test]
async fn openai_uses_bearer_key_and_system_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": "You are a helpful and friendly cooking assistant." },
                { "role": "user", "content": "risotto?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Stir constantly." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        llm_type: LlmType::OpenAI,
        api_key: Some("sk-test".into()),
        base_url: Some(server.uri()),
        ..LlmConfig::default()
    };
    let client = OpenAIChatClient::new(
        build_http_client(&config).unwrap(),
        "sk-test".into(),
        None,
        config.base_url.clone()
    );
    assert_eq!(client.complete("risotto?").await, ChatReply::Success { text: "Stir constantly.".into() });
}
