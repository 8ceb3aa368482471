// OpenAI-compatible chat completions client.
// Works against any endpoint that speaks /chat/completions, including Gemini's OpenAI layer.

use crate::traits::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, GenerateRequest, TextGenerator,
    TokenUsage,
};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    default_model: String,
    default_options: ChatOptions,
}

impl OpenAIClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
            default_model: "gpt-4o-mini".to_string(),
            default_options: ChatOptions::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model used by [`TextGenerator::generate_content`]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Options applied to every [`TextGenerator::generate_content`] call
    pub fn with_default_options(mut self, options: ChatOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.default_model
    }

    fn build_chat_request(&self, model: &str, messages: &[Message], options: &ChatOptions) -> Value {
        let openai_messages: Vec<Value> = messages.iter().map(convert_message).collect();

        let mut obj = Map::new();
        obj.insert("model".to_string(), json!(model));
        obj.insert("messages".to_string(), Value::Array(openai_messages));

        // Reasoning models reject temperature and use a different token field
        let is_reasoning_model = model.starts_with("o1") || model.starts_with("gpt-5");

        if let Some(temp) = options.temperature {
            if !is_reasoning_model {
                obj.insert("temperature".to_string(), json!(temp));
            }
        }
        if let Some(max_tokens) = options.max_tokens {
            let token_field = if is_reasoning_model {
                "max_completion_tokens"
            } else {
                "max_tokens"
            };
            obj.insert(token_field.to_string(), json!(max_tokens));
        }
        if let Some(schema) = &options.response_schema {
            obj.insert(
                "response_format".to_string(),
                json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": schema.name,
                        "schema": schema.schema,
                    }
                }),
            );
        }

        Value::Object(obj)
    }
}

fn convert_message(message: &Message) -> Value {
    match message {
        Message::Human {
            content,
            name: Some(name),
        } => json!({ "role": "user", "content": content, "name": name }),
        other => json!({ "role": other.role(), "content": other.content() }),
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let raw: Value = response.json().await.context("Failed to read response body")?;
        let parsed: OpenAIChatResponse =
            serde_json::from_value(raw.clone()).context("Failed to parse response")?;

        let choice = parsed.choices.into_iter().next();
        Ok(ChatResponse {
            content: choice.as_ref().and_then(|c| c.message.content.clone()),
            finish_reason: choice.and_then(|c| c.finish_reason),
            usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            raw,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    async fn generate_content(&self, request: GenerateRequest) -> Result<String> {
        let mut options = self.default_options.clone();
        options.response_schema = request.schema.clone();

        tracing::debug!(purpose = %request.purpose, model = %self.default_model, "Generating content");

        let response = self
            .chat(ChatRequest::new(self.default_model.clone(), request.to_messages()).with_options(options))
            .await
            .with_context(|| format!("Generation failed for {}", request.purpose))?;

        response
            .content
            .filter(|c| !c.trim().is_empty())
            .with_context(|| format!("Empty completion for {}", request.purpose))
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ResponseSchema;

    #[test]
    fn test_payload_includes_response_format() {
        let client = OpenAIClient::new("key").unwrap();
        let options = ChatOptions::new()
            .temperature(0.2)
            .response_schema(ResponseSchema::new("verdict", json!({"type": "object"})));

        let payload = client.build_chat_request("gpt-4o", &[Message::human("hi")], &options);

        assert_eq!(payload["response_format"]["type"], "json_schema");
        assert_eq!(payload["response_format"]["json_schema"]["name"], "verdict");
        assert_eq!(payload["temperature"], json!(0.2f32));
        assert_eq!(payload["messages"][0]["role"], "user");
    }

    #[test]
    fn test_reasoning_model_drops_temperature() {
        let client = OpenAIClient::new("key").unwrap();
        let options = ChatOptions::new().temperature(0.7).max_tokens(100);

        let payload = client.build_chat_request("gpt-5", &[Message::human("hi")], &options);

        assert!(payload.get("temperature").is_none());
        assert_eq!(payload["max_completion_tokens"], 100);
    }
}
