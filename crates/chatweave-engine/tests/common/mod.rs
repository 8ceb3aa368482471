#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chatweave_engine::{Delivery, Evaluation, ResponseStrategy, StrategyContext};
use chatweave_llm::{GenerateRequest, TextGenerator};
use chatweave_persist::{ChatStore, InMemoryChatStore, MessageStore, PersistError};
use chatweave_types::{Chat, ChatId, ChatSettings, Message, MessageId, Thread};

pub const CHAT: ChatId = 1;

pub fn message(id: MessageId, user_id: i64, text: &str) -> Message {
    Message::new(id, CHAT, user_id, text).with_author("Ann", "Lee", "ann")
}

pub fn thread() -> Thread {
    Thread::new(CHAT, "Weekend plans", "Where to go on Saturday").with_first_message(1)
}

/// Collects everything sent instead of talking to a platform
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingDelivery {
    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, text.to_string()));
        Ok(1000 + sent.len() as MessageId)
    }
}

/// Strategy with a canned evaluation that counts how often it is asked
pub struct FixedStrategy {
    name: &'static str,
    priority: u8,
    evaluation: Option<Evaluation>,
    evaluations: AtomicUsize,
}

impl FixedStrategy {
    pub fn new(name: &'static str, priority: u8, should_respond: bool, confidence: f64) -> Self {
        Self {
            name,
            priority,
            evaluation: Some(Evaluation::new(should_respond, confidence)),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// `should_respond` always errors
    pub fn failing(name: &'static str, priority: u8) -> Self {
        Self {
            name,
            priority,
            evaluation: None,
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseStrategy for FixedStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn should_respond(&self, _ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.evaluation
            .ok_or_else(|| anyhow!("{} is broken", self.name))
    }

    async fn generate_response(&self, _ctx: &StrategyContext<'_>) -> Result<String> {
        Ok(format!("reply from {}", self.name))
    }
}

/// Message store whose writes always fail
pub struct FailingMessageStore;

#[async_trait]
impl MessageStore for FailingMessageStore {
    async fn save(&self, _message: &Message) -> chatweave_persist::Result<()> {
        Err(PersistError::Connection("store unavailable".to_string()))
    }

    async fn get_by_id(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> chatweave_persist::Result<Message> {
        Err(PersistError::MessageNotFound {
            chat_id,
            message_id,
        })
    }

    async fn get_by_chat(&self, _chat_id: ChatId) -> chatweave_persist::Result<Vec<Message>> {
        Ok(Vec::new())
    }
}

/// In-memory chat store whose reads take a while, widening the gap between a
/// read and the write that follows it
pub struct SlowChatStore {
    inner: InMemoryChatStore,
    delay: Duration,
}

impl SlowChatStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryChatStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl ChatStore for SlowChatStore {
    async fn get(&self, chat_id: ChatId) -> chatweave_persist::Result<Option<Chat>> {
        let chat = self.inner.get(chat_id).await;
        tokio::time::sleep(self.delay).await;
        chat
    }

    async fn save(&self, chat: &Chat) -> chatweave_persist::Result<()> {
        self.inner.save(chat).await
    }

    async fn get_settings(&self, chat_id: ChatId) -> chatweave_persist::Result<ChatSettings> {
        self.inner.get_settings(chat_id).await
    }

    async fn save_settings(&self, settings: &ChatSettings) -> chatweave_persist::Result<()> {
        self.inner.save_settings(settings).await
    }
}

/// Backend that never answers in time
pub struct SlowGenerator(pub Duration);

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate_content(&self, _request: GenerateRequest) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Err(anyhow!("too slow"))
    }
}
