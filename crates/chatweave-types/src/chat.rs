use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{ChatId, UserId};
use crate::queue::QueueEntry;

/// Aggregate root for one group chat: members and the question queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chat_type: String,
    #[serde(default)]
    pub description: String,
    /// Member ids in join order, no duplicates
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub question_queue: Vec<QueueEntry>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: ChatId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: String::new(),
            chat_type: "group".to_string(),
            description: String::new(),
            user_ids: Vec::new(),
            question_queue: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_members(mut self, user_ids: impl IntoIterator<Item = UserId>) -> Self {
        for user_id in user_ids {
            self.add_member(user_id);
        }
        self
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.user_ids.contains(&user_id)
    }

    /// Returns false if the user was already a member
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.user_ids.push(user_id);
        self.updated_at = Utc::now();
        true
    }

    pub fn remove_member(&mut self, user_id: UserId) -> bool {
        let before = self.user_ids.len();
        self.user_ids.retain(|id| *id != user_id);
        let removed = self.user_ids.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

/// Per-chat settings, stored separately from the chat aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub chat_id: ChatId,
    pub question_interval_secs: u64,
    pub max_queue_size: usize,
    pub auto_enqueue_new_users: bool,
    pub skip_inactive_users: bool,
    pub inactivity_timeout_secs: u64,
    pub enable_question_rounds: bool,
    pub updated_at: DateTime<Utc>,
}

impl ChatSettings {
    pub fn defaults_for(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            question_interval_secs: 24 * 60 * 60,
            max_queue_size: 50,
            auto_enqueue_new_users: true,
            skip_inactive_users: true,
            inactivity_timeout_secs: 2 * 60 * 60,
            enable_question_rounds: true,
            updated_at: Utc::now(),
        }
    }

    pub fn question_interval(&self) -> Duration {
        Duration::seconds(self.question_interval_secs as i64)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::seconds(self.inactivity_timeout_secs as i64)
    }

    /// New members are queued automatically only when question rounds are on
    pub fn should_auto_enqueue(&self) -> bool {
        self.auto_enqueue_new_users && self.enable_question_rounds
    }
}
