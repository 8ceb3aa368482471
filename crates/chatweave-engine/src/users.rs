use std::sync::Arc;

use chatweave_persist::{PersistError, UserStore};
use chatweave_types::{Message, User, UserId, UserInformation};
use chrono::Utc;
use tracing::debug;

use crate::error::Result;

const MAX_BIO_CHARS: usize = 300;
const MAX_ITEM_CHARS: usize = 100;

/// Member profiles built from message authorship and self-introductions
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(user_id).await?)
    }

    /// Create or refresh the author's profile. Name fields follow the latest message;
    /// bio, interests and hobbies are kept.
    pub async fn track_user(&self, message: &Message) -> Result<User> {
        let user = match self.users.get(message.user_id).await? {
            Some(mut user) => {
                user.first_name = message.first_name.clone();
                user.last_name = message.last_name.clone();
                user.username = message.username.clone();
                user.chat_id = message.chat_id;
                user.updated_at = Utc::now().max(user.created_at);
                user
            }
            None => {
                debug!(user_id = message.user_id, "Tracking new user");
                User::from_message(message)
            }
        };
        self.users.save(&user).await?;
        Ok(user)
    }

    /// Merge extracted self-description into the stored profile
    pub async fn update_profile(&self, user_id: UserId, info: &UserInformation) -> Result<User> {
        let mut user = self
            .users
            .get(user_id)
            .await?
            .ok_or(PersistError::UserNotFound(user_id))?;

        let bio = info.bio.trim();
        if !bio.is_empty() {
            user.bio = truncate_chars(bio, MAX_BIO_CHARS);
        }
        merge_items(&mut user.interests, &info.interests);
        merge_items(&mut user.hobbies, &info.hobbies);
        user.updated_at = Utc::now().max(user.created_at);

        self.users.save(&user).await?;
        Ok(user)
    }

    /// One line describing the user for prompts; empty when nothing is known
    pub fn profile_summary(user: &User) -> String {
        let mut parts = Vec::new();
        if !user.bio.is_empty() {
            parts.push(user.bio.clone());
        }
        if !user.interests.is_empty() {
            parts.push(format!("Interests: {}", user.interests.join(", ")));
        }
        if !user.hobbies.is_empty() {
            parts.push(format!("Hobbies: {}", user.hobbies.join(", ")));
        }
        parts.join(". ")
    }
}

fn merge_items(existing: &mut Vec<String>, incoming: &[String]) {
    for item in incoming {
        let item = truncate_chars(&item.trim().to_lowercase(), MAX_ITEM_CHARS);
        if !item.is_empty() && !existing.contains(&item) {
            existing.push(item);
        }
    }
}

/// Prefix of at most `max` characters, never splitting a code point
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
