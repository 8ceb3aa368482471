//! Prelude module for convenient imports
//!
//! ```rust
//! use chatweave::prelude::*;
//! ```

pub use crate::{
    ChatId, ClientFactory, Delivery, Evaluation, Message, MessageId, Orchestrator,
    PersistClient, ProviderConfig, Reply, ResponseStrategy, StrategyContext, StrategyRegistry,
    TextGenerator, Thread,
};
pub use async_trait::async_trait;
