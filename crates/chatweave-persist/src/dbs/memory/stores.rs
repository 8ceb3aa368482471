// Process-local stores backed by tokio RwLocks. Used when no database is configured and in tests.

use async_trait::async_trait;
use chatweave_types::{Chat, ChatId, ChatSettings, Message, MessageId, Thread, User, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::trait_client::{ChatStore, MessageStore, ThreadStore, UserStore};

#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<HashMap<(ChatId, MessageId), Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(&self, message: &Message) -> Result<()> {
        self.messages
            .write()
            .await
            .insert((message.chat_id, message.id), message.clone());
        Ok(())
    }

    async fn get_by_id(&self, chat_id: ChatId, message_id: MessageId) -> Result<Message> {
        self.messages
            .read()
            .await
            .get(&(chat_id, message_id))
            .cloned()
            .ok_or(PersistError::MessageNotFound {
                chat_id,
                message_id,
            })
    }

    async fn get_by_chat(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .await
            .values()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.date, m.id));
        Ok(messages)
    }
}

/// Threads kept in insertion order so active-thread listings are stable
#[derive(Default)]
pub struct InMemoryThreadStore {
    threads: RwLock<Vec<Thread>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn save(&self, thread: &Thread) -> Result<()> {
        let mut threads = self.threads.write().await;
        match threads.iter_mut().find(|t| t.id == thread.id) {
            Some(existing) => *existing = thread.clone(),
            None => threads.push(thread.clone()),
        }
        Ok(())
    }

    async fn get_by_id(&self, thread_id: &str) -> Result<Thread> {
        self.threads
            .read()
            .await
            .iter()
            .find(|t| t.id == thread_id)
            .cloned()
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn get_by_message_id(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<Option<Thread>> {
        Ok(self
            .threads
            .read()
            .await
            .iter()
            .find(|t| t.chat_id == chat_id && t.contains(message_id))
            .cloned())
    }

    async fn get_active_by_chat(&self, chat_id: ChatId) -> Result<Vec<Thread>> {
        Ok(self
            .threads
            .read()
            .await
            .iter()
            .filter(|t| t.chat_id == chat_id && t.is_active)
            .cloned()
            .collect())
    }

    async fn update(&self, thread: &Thread) -> Result<()> {
        let mut threads = self.threads.write().await;
        let existing = threads
            .iter_mut()
            .find(|t| t.id == thread.id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread.id.clone()))?;
        *existing = thread.clone();
        Ok(())
    }

    async fn deactivate(&self, thread_id: &str) -> Result<()> {
        let mut threads = self.threads.write().await;
        let existing = threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        existing.deactivate();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChatStore {
    chats: RwLock<HashMap<ChatId, Chat>>,
    settings: RwLock<HashMap<ChatId, ChatSettings>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Chat>> {
        Ok(self.chats.read().await.get(&chat_id).cloned())
    }

    async fn save(&self, chat: &Chat) -> Result<()> {
        self.chats.write().await.insert(chat.id, chat.clone());
        Ok(())
    }

    async fn get_settings(&self, chat_id: ChatId) -> Result<ChatSettings> {
        Ok(self
            .settings
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_else(|| ChatSettings::defaults_for(chat_id)))
    }

    async fn save_settings(&self, settings: &ChatSettings) -> Result<()> {
        self.settings
            .write()
            .await
            .insert(settings.chat_id, settings.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}
