use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatweave_types::{Chat, ChatId, MessageId, QueueEntry, Thread};

/// MongoDB thread document (`_id` is the thread uuid)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: ChatId,
    pub theme: String,
    pub summary: String,
    pub message_ids: Vec<MessageId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// MongoDB chat document (`_id` is the platform chat id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChat {
    #[serde(rename = "_id")]
    pub id: ChatId,
    pub title: String,
    pub chat_type: String,
    pub description: String,
    pub user_ids: Vec<i64>,
    pub question_queue: Vec<QueueEntry>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<Thread> for MongoThread {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            chat_id: thread.chat_id,
            theme: thread.theme,
            summary: thread.summary,
            message_ids: thread.message_ids,
            is_active: thread.is_active,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id,
            chat_id: thread.chat_id,
            theme: thread.theme,
            summary: thread.summary,
            message_ids: thread.message_ids,
            is_active: thread.is_active,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl From<Chat> for MongoChat {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            title: chat.title,
            chat_type: chat.chat_type,
            description: chat.description,
            user_ids: chat.user_ids,
            question_queue: chat.question_queue,
            is_active: chat.is_active,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

impl From<MongoChat> for Chat {
    fn from(chat: MongoChat) -> Self {
        Self {
            id: chat.id,
            title: chat.title,
            chat_type: chat.chat_type,
            description: chat.description,
            user_ids: chat.user_ids,
            question_queue: chat.question_queue,
            is_active: chat.is_active,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}
