use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{ChatId, MessageId};

/// One evolving topic within a chat.
///
/// The member list is append-only while the thread is active; threads are deactivated,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub chat_id: ChatId,
    pub theme: String,
    pub summary: String,
    pub message_ids: Vec<MessageId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(chat_id: ChatId, theme: impl Into<String>, summary: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id,
            theme: theme.into(),
            summary: summary.into(),
            message_ids: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_first_message(mut self, message_id: MessageId) -> Self {
        self.message_ids.push(message_id);
        self
    }

    pub fn contains(&self, message_id: MessageId) -> bool {
        self.message_ids.contains(&message_id)
    }

    /// Appends a member message. Returns false for inactive threads and for ids already
    /// present, leaving the thread untouched.
    pub fn append_message(&mut self, message_id: MessageId) -> bool {
        if !self.is_active || self.contains(message_id) {
            return false;
        }
        self.message_ids.push(message_id);
        self.touch();
        true
    }

    /// The last `n` member ids, oldest first
    pub fn recent_message_ids(&self, n: usize) -> &[MessageId] {
        let start = self.message_ids.len().saturating_sub(n);
        &self.message_ids[start..]
    }

    pub fn message_count(&self) -> usize {
        self.message_ids.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    DirectReply,
    Classified,
    Created,
}

/// Result of classifying one message. Not persisted.
#[derive(Debug, Clone)]
pub struct ThreadMatch {
    pub thread: Thread,
    pub probability: f64,
    pub reasoning: String,
    pub kind: MatchKind,
}
