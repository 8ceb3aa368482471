use crate::types::Message;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait for chat-based LLM interactions
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Narrow text-generation contract consumed by the engine.
///
/// When the request carries a [`ResponseSchema`], the returned text is expected to be a
/// JSON document conforming to it. Parsing is the caller's job, see
/// [`crate::structured::generate_structured`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(&self, request: GenerateRequest) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_schema: Option<ResponseSchema>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// JSON-schema constraint on the shape of a generated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// A single generation call.
///
/// `purpose` is a stable label for the call site (e.g. `thread_summary`). It shows up in logs
/// and lets test doubles answer per call site.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub purpose: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub schema: Option<ResponseSchema>,
}

impl GenerateRequest {
    pub fn new(purpose: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            prompt: prompt.into(),
            system_instruction: None,
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Messages for a chat-completion backend
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(instruction) = &self.system_instruction {
            messages.push(Message::system(instruction.clone()));
        }
        messages.push(Message::human(self.prompt.clone()));
        messages
    }
}
