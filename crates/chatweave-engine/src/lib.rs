pub mod arbitrator;
pub mod builder;
pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod queue;
pub mod strategies;
pub mod users;

pub use arbitrator::{Reply, ResponseArbitrator, StrategyResult};
pub use builder::OrchestratorBuilder;
pub use classifier::ThreadClassifier;
pub use error::{EngineError, Result};
pub use orchestrator::{
    ChatGuard, ChatLocks, Delivery, Orchestrator, ProcessOutcome, EMPTY_QUEUE_TEXT,
};
pub use queue::QueueService;
pub use strategies::{
    Evaluation, QuestionPrompt, QuestionStrategy, ResponseStrategy, StrategyContext,
    StrategyRegistry,
};
pub use users::UserService;
