use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ChatId = i64;
pub type UserId = i64;
/// Platform message id, unique within one chat
pub type MessageId = i64;

/// An inbound chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<MessageId>,
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_bot: bool,
}

impl Message {
    pub fn new(id: MessageId, chat_id: ChatId, user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            id,
            chat_id,
            reply_to_message_id: None,
            user_id,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            text: text.into(),
            date: Utc::now(),
            is_bot: false,
        }
    }

    pub fn with_reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn with_author(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self.username = username.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn automated(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// First name, falling back to the username, then the numeric id
    pub fn display_name(&self) -> String {
        if !self.first_name.is_empty() {
            self.first_name.clone()
        } else if !self.username.is_empty() {
            self.username.clone()
        } else {
            format!("user {}", self.user_id)
        }
    }
}
