use cagematch::completion::{ChatCompletionClient, CompletionError, CompletionService};
use cagematch::config::LlmSettings;
use cagematch::entities::RawMovieRecord;
use cagematch::normalizer::Normalizer;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn client(server: &MockServer) -> ChatCompletionClient {
    ChatCompletionClient::new(&LlmSettings {
        base_url: format!("{}/v1", server.uri()),
        api_key: Some("sk-test".to_string()),
        model: "gpt-4o".to_string(),
        max_tokens: 3000,
    })
    .unwrap()
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn test_complete_sends_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "temperature": 0.1,
            "max_tokens": 3000,
            "messages": [
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).complete("hello", "be terse").await.unwrap();
    assert_eq!(reply, "[]");
}

#[tokio::test]
async fn test_complete_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client(&server).complete("hello", "sys").await.unwrap_err();
    match err {
        CompletionError::Http { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("Expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_complete_without_choices_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client(&server).complete("hello", "sys").await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}

#[tokio::test]
async fn test_normalizer_over_http_uses_service_and_fallback() {
    let server = MockServer::start().await;

    let cleaned = json!([
        {"rank": 1, "title": "Face/Off", "release_year": 1997, "imdb_rating": 7.3,
         "runtime": "138 min", "genres": ["Action", "Crime", "Sci-Fi"], "imdb_url": null},
        {"rank": 2, "title": "Con Air", "release_year": 1997, "imdb_rating": null,
         "runtime": null, "genres": [], "imdb_url": null}
    ]);

    // first batch mentions "1. Face/Off" and gets a fenced, valid reply
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(wiremock::matchers::body_string_contains("1. Face/Off"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply(&format!("```json\n{cleaned}\n```"))),
        )
        .mount(&server)
        .await;

    // second batch gets prose and falls back
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(wiremock::matchers::body_string_contains("3. Mandy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("I cannot help with that.")))
        .mount(&server)
        .await;

    let mut face_off = RawMovieRecord::new("1. Face/Off", 1);
    face_off.raw_year = "1997".to_string();
    let mut mandy = RawMovieRecord::new("3. Mandy", 3);
    mandy.raw_rating = "6.5".to_string();
    let raw = vec![face_off, RawMovieRecord::new("2. Con Air", 2), mandy];

    let normalizer = Normalizer::new(Arc::new(client(&server)))
        .with_batch_size(2)
        .with_batch_delay(Duration::from_millis(10));
    let records = normalizer.normalize(&raw).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].title, "Face/Off");
    assert_eq!(records[1].title, "Con Air");
    assert_eq!(records[2].title, "3. Mandy");
    assert_eq!(records[2].imdb_rating, Some(6.5));
    assert_eq!(records[2].rank, 3);
}
