//! # Chatweave
//!
//! Engine for a group-chat assistant. Every inbound message is filed into a
//! conversation thread, a set of reply strategies competes to answer it, and a
//! per-chat queue drives rounds of questions addressed to individual members.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatweave::prelude::*;
//! use std::sync::Arc;
//!
//! struct Stdout;
//!
//! #[async_trait]
//! impl Delivery for Stdout {
//!     async fn send_text(&self, chat_id: ChatId, text: &str) -> anyhow::Result<MessageId> {
//!         println!("[{}] {}", chat_id, text);
//!         Ok(0)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let generator = ClientFactory::create_generator(ProviderConfig::gemini(
//!         std::env::var("LLM_API_KEY")?,
//!         "gemini-2.5-flash",
//!     ))?;
//!
//!     let orchestrator = Orchestrator::builder().generator(generator).build()?;
//!     let delivery: Arc<dyn Delivery> = Arc::new(Stdout);
//!     orchestrator.attach_delivery(&delivery);
//!
//!     let outcome = orchestrator
//!         .process_message(Message::new(1, 42, 7, "Shall we meet on Friday?"))
//!         .await?;
//!     println!("filed into thread {}", outcome.thread_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`chatweave-types`**: messages, threads, chats with their question queue, users
//! - **`chatweave-llm`**: OpenAI-compatible text generation and structured JSON calls
//! - **`chatweave-persist`**: store traits with in-memory and MongoDB backends
//! - **`chatweave-engine`**: classifier, strategies, arbitrator and orchestrator

pub mod prelude;

pub use chatweave_engine::{
    Delivery, EngineError, Evaluation, Orchestrator, OrchestratorBuilder, ProcessOutcome,
    QueueService, QuestionPrompt, QuestionStrategy, Reply, ResponseArbitrator,
    ResponseStrategy, StrategyContext, StrategyRegistry, ThreadClassifier, UserService,
};

pub use chatweave_llm::{
    generate_structured, ClientFactory, GenerateRequest, OpenAIClient, ProviderConfig,
    ResponseSchema, ScriptedGenerator, StructuredError, TextGenerator,
};

pub use chatweave_persist::{
    ChatStore, MessageStore, PersistClient, PersistClientBuilder, PersistError, ThreadStore,
    UserStore,
};

#[cfg(feature = "mongodb")]
pub use chatweave_persist::MongoPersistenceClient;

pub use chatweave_types::{
    ArbitratorConfig, Chat, ChatId, ChatSettings, ClassifierConfig, MatchKind, Message,
    MessageId, PipelineConfig, QueueEntry, QueueError, QueueStatus, Thread, ThreadMatch, User,
    UserId, UserInformation,
};
