use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{ChatId, Message, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    pub chat_id: ChatId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh profile from a message author
    pub fn from_message(message: &Message) -> Self {
        let now = Utc::now();
        Self {
            id: message.user_id,
            first_name: message.first_name.clone(),
            last_name: message.last_name.clone(),
            username: message.username.clone(),
            bio: String::new(),
            interests: Vec::new(),
            hobbies: Vec::new(),
            chat_id: message.chat_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn has_profile(&self) -> bool {
        !self.bio.is_empty() || !self.interests.is_empty() || !self.hobbies.is_empty()
    }
}

/// Self-description extracted from an introduction message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInformation {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
}

impl UserInformation {
    pub fn is_empty(&self) -> bool {
        self.bio.trim().is_empty() && self.interests.is_empty() && self.hobbies.is_empty()
    }
}
