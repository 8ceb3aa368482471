//! Pluggable reply strategies.
//!
//! A strategy scores how relevant it is to the newest message and, when it wins
//! arbitration, produces the reply text. Strategies are registered by name in a
//! [`StrategyRegistry`]; adding an intent means implementing [`ResponseStrategy`].

mod agreement;
mod assessment;
mod fact_checking;
mod general;
mod introduction;
mod question;
mod reminder;

pub use agreement::AgreementStrategy;
pub use assessment::AssessmentStrategy;
pub use fact_checking::FactCheckingStrategy;
pub use general::GeneralStrategy;
pub use introduction::IntroductionStrategy;
pub use question::{QuestionPrompt, QuestionStrategy};
pub use reminder::ReminderStrategy;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chatweave_llm::TextGenerator;
use chatweave_types::{Message, Thread};

use crate::queue::QueueService;
use crate::users::UserService;

/// Everything a strategy may look at for one decision
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub thread: &'a Thread,
    /// Thread context window, oldest first. May include `message` itself.
    pub recent_messages: &'a [Message],
    pub message: &'a Message,
}

impl<'a> StrategyContext<'a> {
    pub fn new(thread: &'a Thread, recent_messages: &'a [Message], message: &'a Message) -> Self {
        Self {
            thread,
            recent_messages,
            message,
        }
    }

    /// Context window without the newest message
    pub fn history(&self) -> &'a [Message] {
        match self.recent_messages.last() {
            Some(last) if last.id == self.message.id => {
                &self.recent_messages[..self.recent_messages.len() - 1]
            }
            _ => self.recent_messages,
        }
    }
}

/// A strategy's own relevance judgment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub should_respond: bool,
    /// In [0, 1]
    pub confidence: f64,
}

impl Evaluation {
    pub fn respond(confidence: f64) -> Self {
        Self {
            should_respond: true,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn pass() -> Self {
        Self {
            should_respond: false,
            confidence: 0.0,
        }
    }

    pub fn new(should_respond: bool, confidence: f64) -> Self {
        Self {
            should_respond,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
pub trait ResponseStrategy: Send + Sync {
    /// Stable identifier, matched against backend suggestions
    fn name(&self) -> &str;

    /// Weight in [0, 100]
    fn priority(&self) -> u8;

    /// Must not change persisted state
    async fn should_respond(&self, ctx: &StrategyContext<'_>) -> Result<Evaluation>;

    /// Only called for the winning strategy. May have side effects.
    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String>;
}

/// Ordered set of strategies with unique names
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn ResponseStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full set: general, introduction, fact_checking, agreement, reminder,
    /// assessment, question
    pub fn standard(
        generator: Arc<dyn TextGenerator>,
        users: UserService,
        queue: QueueService,
    ) -> Self {
        Self::new()
            .with(Arc::new(GeneralStrategy::new(Arc::clone(&generator))))
            .with(Arc::new(IntroductionStrategy::new(
                Arc::clone(&generator),
                users.clone(),
            )))
            .with(Arc::new(FactCheckingStrategy::new(Arc::clone(&generator))))
            .with(Arc::new(AgreementStrategy::new(Arc::clone(&generator))))
            .with(Arc::new(ReminderStrategy::new(Arc::clone(&generator))))
            .with(Arc::new(AssessmentStrategy::new(
                Arc::clone(&generator),
                queue.clone(),
            )))
            .with(Arc::new(QuestionStrategy::new(generator, users, queue)))
    }

    pub fn with(mut self, strategy: Arc<dyn ResponseStrategy>) -> Self {
        self.register(strategy);
        self
    }

    /// Appends, or replaces in place a strategy with the same name
    pub fn register(&mut self, strategy: Arc<dyn ResponseStrategy>) {
        match self
            .strategies
            .iter_mut()
            .find(|s| s.name() == strategy.name())
        {
            Some(existing) => *existing = strategy,
            None => self.strategies.push(strategy),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ResponseStrategy>> {
        self.strategies.iter().find(|s| s.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ResponseStrategy>> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// First keyword contained in the lowercased text
pub(crate) fn find_keyword<'k>(text: &str, keywords: &[&'k str]) -> Option<&'k str> {
    let lowered = text.to_lowercase();
    keywords.iter().copied().find(|k| lowered.contains(k))
}
