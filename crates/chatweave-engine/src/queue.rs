//! Storage-backed access to the per-chat question queue.
//!
//! Every operation loads the chat aggregate, applies one of the pure transitions defined on
//! [`Chat`] and saves it back. Nothing here locks: concurrent writers to one chat must be
//! serialized by the caller. The `Orchestrator` does so with `ChatLocks` for every mutation
//! it exposes.

use std::sync::Arc;

use chatweave_persist::{ChatStore, PersistError};
use chatweave_types::{Chat, ChatId, ChatSettings, QueueEntry, QueueError, UserId};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::Result;

#[derive(Clone)]
pub struct QueueService {
    chats: Arc<dyn ChatStore>,
}

impl QueueService {
    pub fn new(chats: Arc<dyn ChatStore>) -> Self {
        Self { chats }
    }

    pub async fn settings(&self, chat_id: ChatId) -> Result<ChatSettings> {
        Ok(self.chats.get_settings(chat_id).await?)
    }

    pub async fn save_settings(&self, settings: &ChatSettings) -> Result<()> {
        Ok(self.chats.save_settings(settings).await?)
    }

    /// Fails with `ChatNotFound` when the chat was never seen
    pub async fn get_chat(&self, chat_id: ChatId) -> Result<Chat> {
        Ok(self
            .chats
            .get(chat_id)
            .await?
            .ok_or(PersistError::ChatNotFound(chat_id))?)
    }

    /// Create the chat if missing, otherwise refresh its title. Members and queue are kept.
    pub async fn ensure_chat(&self, chat_id: ChatId, title: &str) -> Result<Chat> {
        let chat = match self.chats.get(chat_id).await? {
            Some(mut chat) => {
                if !title.is_empty() && chat.title != title {
                    chat.title = title.to_string();
                    chat.updated_at = Utc::now();
                    self.chats.save(&chat).await?;
                }
                chat
            }
            None => {
                let chat = Chat::new(chat_id).with_title(title);
                self.chats.save(&chat).await?;
                info!(chat_id, "Registered new chat");
                chat
            }
        };
        Ok(chat)
    }

    /// Adds the user to the member set. New members are enqueued when the chat settings
    /// allow it. Returns whether the user was new to the chat.
    pub async fn add_member(&self, chat_id: ChatId, user_id: UserId) -> Result<bool> {
        let mut chat = self
            .chats
            .get(chat_id)
            .await?
            .unwrap_or_else(|| Chat::new(chat_id));
        if !chat.add_member(user_id) {
            return Ok(false);
        }

        let settings = self.chats.get_settings(chat_id).await?;
        if settings.should_auto_enqueue() && chat.waiting_count() < settings.max_queue_size {
            chat.enqueue(user_id, Utc::now());
            debug!(chat_id, user_id, "Auto-enqueued new member");
        }
        self.chats.save(&chat).await?;
        Ok(true)
    }

    /// Removes the user from the member set and the queue
    pub async fn remove_member(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        let mut chat = self.get_chat(chat_id).await?;
        chat.remove_member(user_id);
        match chat.dequeue(user_id) {
            Err(e) if !e.is_not_found() => return Err(e.into()),
            // Not being queued is fine here
            _ => {}
        }
        self.chats.save(&chat).await?;
        Ok(())
    }

    /// Settings-aware enqueue. Returns false when the user already had an active entry.
    pub async fn enqueue_user(&self, chat_id: ChatId, user_id: UserId) -> Result<bool> {
        let settings = self.chats.get_settings(chat_id).await?;
        if !settings.enable_question_rounds {
            return Err(QueueError::QuestionRoundsDisabled(chat_id).into());
        }
        self.modify(chat_id, |chat| {
            if chat.waiting_count() >= settings.max_queue_size {
                return Err(QueueError::QueueFull {
                    chat_id,
                    max: settings.max_queue_size,
                });
            }
            Ok(chat.enqueue(user_id, Utc::now()))
        })
        .await
    }

    pub async fn dequeue(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        self.modify(chat_id, |chat| chat.dequeue(user_id)).await
    }

    pub async fn next_waiting(&self, chat_id: ChatId) -> Result<QueueEntry> {
        let chat = self.get_chat(chat_id).await?;
        Ok(chat.next_waiting()?.clone())
    }

    pub async fn mark_asked(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        question_id: &str,
    ) -> Result<()> {
        self.modify(chat_id, |chat| {
            chat.mark_asked(user_id, question_id, Utc::now())
        })
        .await
    }

    pub async fn mark_answered(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        self.modify(chat_id, |chat| chat.mark_answered(user_id, Utc::now()))
            .await
    }

    /// The reason is only logged
    pub async fn skip(&self, chat_id: ChatId, user_id: UserId, reason: &str) -> Result<()> {
        self.modify(chat_id, |chat| chat.skip(user_id, Utc::now())).await?;
        info!(chat_id, user_id, reason, "Skipped queued user");
        Ok(())
    }

    pub async fn clear_completed(&self, chat_id: ChatId) -> Result<usize> {
        self.modify(chat_id, |chat| Ok(chat.clear_completed())).await
    }

    pub async fn reset_queue(&self, chat_id: ChatId) -> Result<Vec<QueueEntry>> {
        self.modify(chat_id, |chat| {
            chat.reset_queue(Utc::now());
            Ok(chat.question_queue.clone())
        })
        .await
    }

    pub async fn position(&self, chat_id: ChatId, user_id: UserId) -> Result<usize> {
        let chat = self.get_chat(chat_id).await?;
        Ok(chat.position(user_id)?)
    }

    /// The user's most recent entry, if any
    pub async fn entry(&self, chat_id: ChatId, user_id: UserId) -> Result<Option<QueueEntry>> {
        Ok(self
            .chats
            .get(chat_id)
            .await?
            .and_then(|chat| chat.queue_entry(user_id).cloned()))
    }

    /// Full queue in order; empty for unknown chats
    pub async fn entries(&self, chat_id: ChatId) -> Result<Vec<QueueEntry>> {
        Ok(self
            .chats
            .get(chat_id)
            .await?
            .map(|chat| chat.question_queue)
            .unwrap_or_default())
    }

    /// Skips every `asking` entry older than the chat's inactivity timeout, so a question
    /// that never got an answer does not block the queue. No-op unless
    /// `skip_inactive_users` is set. Returns the skipped users.
    pub async fn expire_stale_asking(
        &self,
        chat_id: ChatId,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>> {
        let settings = self.chats.get_settings(chat_id).await?;
        if !settings.skip_inactive_users {
            return Ok(Vec::new());
        }
        let Some(mut chat) = self.chats.get(chat_id).await? else {
            return Ok(Vec::new());
        };

        let stale = chat.stale_asking(now, settings.inactivity_timeout());
        if stale.is_empty() {
            return Ok(stale);
        }
        for user_id in &stale {
            chat.skip(*user_id, now)?;
            info!(chat_id, user_id, reason = "inactivity timeout", "Skipped queued user");
        }
        self.chats.save(&chat).await?;
        Ok(stale)
    }

    async fn modify<T>(
        &self,
        chat_id: ChatId,
        apply: impl FnOnce(&mut Chat) -> std::result::Result<T, QueueError>,
    ) -> Result<T> {
        let mut chat = self.get_chat(chat_id).await?;
        let value = apply(&mut chat)?;
        self.chats.save(&chat).await?;
        Ok(value)
    }
}
