pub mod chat;
pub mod config;
pub mod message;
pub mod queue;
pub mod thread;
pub mod user;

pub use chat::{Chat, ChatSettings};
pub use config::{ArbitratorConfig, ClassifierConfig, PipelineConfig};
pub use message::{ChatId, Message, MessageId, UserId};
pub use queue::{QueueEntry, QueueError, QueueStatus};
pub use thread::{MatchKind, Thread, ThreadMatch};
pub use user::{User, UserInformation};
