// Provider configuration and client factory

use crate::openai::OpenAIClient;
use crate::traits::{ChatOptions, TextGenerator};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Base URL of Gemini's OpenAI-compatible endpoint
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
    /// Defaults to https://api.openai.com/v1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::openai(api_key, model).with_base_url(GEMINI_OPENAI_BASE)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Factory for creating generation clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: ProviderConfig) -> Result<OpenAIClient> {
        let mut options = ChatOptions::new();
        options.temperature = config.temperature;
        options.max_tokens = config.max_tokens;

        let mut client = OpenAIClient::new(config.api_key)?
            .with_model(config.model)
            .with_default_options(options);
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }

    pub fn create_generator(config: ProviderConfig) -> Result<Arc<dyn TextGenerator>> {
        Ok(Arc::new(Self::create_client(config)?))
    }
}
