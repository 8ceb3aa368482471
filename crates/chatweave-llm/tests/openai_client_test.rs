use chatweave_llm::{
    ChatClient, ChatRequest, GenerateRequest, Message, OpenAIClient, ResponseSchema,
    TextGenerator,
};
use serde_json::json;

fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
    })
    .to_string()
}

#[tokio::test]
async fn test_chat_parses_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("Hello there"))
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key").unwrap().with_base_url(server.url());
    let response = client
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("Hi")]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("Hello there"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 17);
}

#[tokio::test]
async fn test_generate_content_sends_schema() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::PartialJson(json!({
            "model": "gemini-2.5-flash",
            "response_format": {"type": "json_schema", "json_schema": {"name": "summary"}}
        })))
        .with_status(200)
        .with_body(completion_body(r#"{"theme":"Trip","summary":"Planning a trip"}"#))
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url())
        .with_model("gemini-2.5-flash");
    let request = GenerateRequest::new("thread_summary", "Summarize")
        .with_schema(ResponseSchema::new("summary", json!({"type": "object"})));

    let text = client.generate_content(request).await.unwrap();

    mock.assert_async().await;
    assert!(text.contains("Planning a trip"));
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key").unwrap().with_base_url(server.url());
    let result = client
        .generate_content(GenerateRequest::new("general_response", "Hi"))
        .await;

    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("429"));
}
