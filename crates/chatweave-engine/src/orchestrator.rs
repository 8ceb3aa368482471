//! Per-message pipeline: save, classify, arbitrate, deliver.
//!
//! Messages of one chat are processed one at a time; different chats run concurrently.
//! Backend problems degrade inside the classifier and arbitrator, persistence failures
//! abort the message, and user tracking failures are only logged.

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex as StdMutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use std::time::Duration;

use async_trait::async_trait;
use chatweave_persist::MessageStore;
use chatweave_types::{ChatId, MatchKind, Message, MessageId, PipelineConfig, QueueEntry, UserId};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::arbitrator::{Reply, ResponseArbitrator};
use crate::classifier::ThreadClassifier;
use crate::error::{EngineError, Result};
use crate::queue::QueueService;
use crate::strategies::{QuestionPrompt, QuestionStrategy, StrategyContext};
use crate::users::UserService;

/// Text sent when a question round finds nobody waiting
pub const EMPTY_QUEUE_TEXT: &str = "No users are currently in the question queue.";

/// Outbound side of the messaging platform
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Returns the platform id of the sent message
    async fn send_text(&self, chat_id: ChatId, text: &str) -> anyhow::Result<MessageId>;
}

/// One async mutex per chat. Entries are created on first use and dropped once no
/// guard holds or waits on them, so the map only covers chats with work in flight.
/// A wait abandoned by a timeout can leave an idle entry until that chat's next release.
#[derive(Default)]
pub struct ChatLocks {
    locks: StdMutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, chat_id: ChatId) -> ChatGuard<'_> {
        let lock = {
            let mut locks = lock_map(&self.locks);
            Arc::clone(locks.entry(chat_id).or_default())
        };
        ChatGuard {
            locks: self,
            chat_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Chats with a held or awaited lock
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, chat_id: ChatId) {
        let mut locks = lock_map(&self.locks);
        // Only the map's own reference left: nobody holds or waits on it
        if locks
            .get(&chat_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&chat_id);
        }
    }
}

/// Exclusive access to one chat until dropped
pub struct ChatGuard<'a> {
    locks: &'a ChatLocks,
    chat_id: ChatId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ChatGuard<'_> {
    fn drop(&mut self) {
        // Release the mutex before checking whether the entry is still in use
        drop(self.guard.take());
        self.locks.release(self.chat_id);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub thread_id: String,
    pub match_kind: MatchKind,
    pub match_probability: f64,
    pub reply: Option<Reply>,
}

pub struct Orchestrator {
    messages: Arc<dyn MessageStore>,
    classifier: ThreadClassifier,
    arbitrator: ResponseArbitrator,
    users: UserService,
    queue: QueueService,
    questions: QuestionStrategy,
    delivery: RwLock<Option<Weak<dyn Delivery>>>,
    locks: ChatLocks,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        classifier: ThreadClassifier,
        arbitrator: ResponseArbitrator,
        users: UserService,
        queue: QueueService,
        questions: QuestionStrategy,
        config: PipelineConfig,
    ) -> Self {
        Self {
            messages,
            classifier,
            arbitrator,
            users,
            queue,
            questions,
            delivery: RwLock::new(None),
            locks: ChatLocks::new(),
            config,
        }
    }

    pub fn builder() -> crate::builder::OrchestratorBuilder {
        crate::builder::OrchestratorBuilder::new()
    }

    /// Late-bind the delivery client. Only a weak reference is kept; the caller owns it.
    pub fn attach_delivery(&self, delivery: &Arc<dyn Delivery>) {
        *write(&self.delivery) = Some(Arc::downgrade(delivery));
    }

    pub fn queue(&self) -> &QueueService {
        &self.queue
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn process_message(&self, message: Message) -> Result<ProcessOutcome> {
        self.process_message_with_deadline(message, self.config.processing_timeout)
            .await
    }

    /// Like [`Self::process_message`] but bounded by `deadline`, lock wait included.
    /// An expired deadline drops the in-flight work; nothing is retried.
    pub async fn process_message_with_deadline(
        &self,
        message: Message,
        deadline: Duration,
    ) -> Result<ProcessOutcome> {
        let (chat_id, message_id) = (message.chat_id, message.id);
        let work = async {
            let _guard = self.locks.acquire(chat_id).await;
            self.run_pipeline(message).await
        };
        match tokio::time::timeout(deadline, work).await {
            Ok(result) => result,
            Err(_) => {
                error!(chat_id, message_id, "Message processing timed out");
                Err(EngineError::DeadlineExceeded(deadline))
            }
        }
    }

    /// Ask the next queued member a question and send it. With `announce_empty_queue`,
    /// an empty queue is reported to the chat instead of staying silent.
    pub async fn run_question_round(
        &self,
        chat_id: ChatId,
        announce_empty_queue: bool,
    ) -> Result<Option<QuestionPrompt>> {
        let _guard = self.locks.acquire(chat_id).await;

        match self.questions.ask_next_user(chat_id).await? {
            Some(prompt) => {
                self.deliver(chat_id, &prompt.text).await?;
                Ok(Some(prompt))
            }
            None => {
                if announce_empty_queue {
                    self.deliver(chat_id, EMPTY_QUEUE_TEXT).await?;
                }
                Ok(None)
            }
        }
    }

    /// Apply membership changes reported by the platform. A non-empty `title` registers
    /// or renames the chat.
    pub async fn handle_membership(
        &self,
        chat_id: ChatId,
        title: Option<&str>,
        joined: &[UserId],
        left: &[UserId],
    ) -> Result<()> {
        let _guard = self.locks.acquire(chat_id).await;

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            self.queue.ensure_chat(chat_id, title).await?;
        }
        for &user_id in joined {
            if self.queue.add_member(chat_id, user_id).await? {
                info!(chat_id, user_id, "New chat member");
            }
        }
        for &user_id in left {
            self.queue.remove_member(chat_id, user_id).await?;
            info!(chat_id, user_id, "Member left chat");
        }
        Ok(())
    }

    /// Rebuild the chat's queue from its members
    pub async fn reset_queue(&self, chat_id: ChatId) -> Result<Vec<QueueEntry>> {
        let _guard = self.locks.acquire(chat_id).await;
        self.queue.reset_queue(chat_id).await
    }

    /// Drop completed and skipped entries, returning how many were removed
    pub async fn clear_completed(&self, chat_id: ChatId) -> Result<usize> {
        let _guard = self.locks.acquire(chat_id).await;
        self.queue.clear_completed(chat_id).await
    }

    async fn run_pipeline(&self, message: Message) -> Result<ProcessOutcome> {
        info!(
            chat_id = message.chat_id,
            message_id = message.id,
            user_id = message.user_id,
            "Processing message"
        );

        self.messages.save(&message).await?;

        if !message.is_bot {
            self.track_member(&message).await;
        }

        let matched = self.classifier.classify_message(&message).await?;
        info!(
            thread_id = %matched.thread.id,
            theme = %matched.thread.theme,
            probability = matched.probability,
            "Message classified"
        );
        let mut outcome = ProcessOutcome {
            thread_id: matched.thread.id.clone(),
            match_kind: matched.kind,
            match_probability: matched.probability,
            reply: None,
        };

        if message.is_bot {
            debug!(message_id = message.id, "Automated author, not arbitrating");
            return Ok(outcome);
        }

        let mut context = self
            .classifier
            .load_messages(&matched.thread, self.config.context_window)
            .await;
        if context.is_empty() {
            context.push(message.clone());
        }

        let ctx = StrategyContext::new(&matched.thread, &context, &message);
        let reply = match self.arbitrator.analyze_and_respond(&ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(message_id = message.id, "Response generation failed: {:#}", e);
                None
            }
        };

        match reply {
            Some(reply) if !reply.text.trim().is_empty() => {
                self.deliver(message.chat_id, &reply.text).await?;
                outcome.reply = Some(reply);
            }
            _ => debug!(message_id = message.id, "No response needed"),
        }
        Ok(outcome)
    }

    async fn track_member(&self, message: &Message) {
        if let Err(e) = self.users.track_user(message).await {
            warn!(user_id = message.user_id, "Failed to track user: {}", e);
        }
        match self.queue.add_member(message.chat_id, message.user_id).await {
            Ok(true) => info!(
                chat_id = message.chat_id,
                user_id = message.user_id,
                "New chat member"
            ),
            Ok(false) => {}
            Err(e) => warn!(
                chat_id = message.chat_id,
                user_id = message.user_id,
                "Failed to track membership: {}",
                e
            ),
        }
    }

    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<MessageId> {
        let delivery = read(&self.delivery)
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(EngineError::DeliveryDetached)?;

        let sent = delivery
            .send_text(chat_id, text)
            .await
            .map_err(EngineError::Delivery)?;
        info!(chat_id, sent_message_id = sent, len = text.len(), "Response sent");
        Ok(sent)
    }
}

fn lock_map<T>(lock: &StdMutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
