pub mod config;
pub mod mock;
pub mod openai;
pub mod structured;
pub mod traits;
pub mod types;

pub use config::{ClientFactory, ProviderConfig, GEMINI_OPENAI_BASE};
pub use mock::ScriptedGenerator;
pub use openai::OpenAIClient;
pub use structured::{generate_structured, parse_json, StructuredError};
pub use traits::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, GenerateRequest, ResponseSchema,
    TextGenerator, TokenUsage,
};
pub use types::Message;
