use async_trait::async_trait;
use chatweave_types::{Chat, ChatId, ChatSettings, Message, MessageId, Thread, User, UserId};

use crate::error::Result;

/// Inbound message storage.
///
/// Messages are keyed by `(chat_id, message_id)` because platform ids are only unique
/// within a chat.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn save(&self, message: &Message) -> Result<()>;

    /// Fails with `MessageNotFound` when absent
    async fn get_by_id(&self, chat_id: ChatId, message_id: MessageId) -> Result<Message>;

    /// All messages of a chat, oldest first
    async fn get_by_chat(&self, chat_id: ChatId) -> Result<Vec<Message>>;
}

#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn save(&self, thread: &Thread) -> Result<()>;

    /// Fails with `ThreadNotFound` when absent
    async fn get_by_id(&self, thread_id: &str) -> Result<Thread>;

    /// The thread containing the message, if any
    async fn get_by_message_id(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<Option<Thread>>;

    /// Active threads of a chat, oldest first
    async fn get_active_by_chat(&self, chat_id: ChatId) -> Result<Vec<Thread>>;

    /// Fails with `ThreadNotFound` if the thread was never saved
    async fn update(&self, thread: &Thread) -> Result<()>;

    async fn deactivate(&self, thread_id: &str) -> Result<()>;
}

/// Read-modify-write access to the chat aggregate and its settings
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Chat>>;

    async fn save(&self, chat: &Chat) -> Result<()>;

    /// Stored settings, or `ChatSettings::defaults_for` when none exist
    async fn get_settings(&self, chat_id: ChatId) -> Result<ChatSettings>;

    async fn save_settings(&self, settings: &ChatSettings) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<Option<User>>;

    async fn save(&self, user: &User) -> Result<()>;
}
