use chatweave_types::{ChatId, MessageId, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("Chat not found: {0}")]
    ChatNotFound(ChatId),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Message {message_id} not found in chat {chat_id}")]
    MessageNotFound { chat_id: ChatId, message_id: MessageId },

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ChatNotFound(_)
                | Self::ThreadNotFound(_)
                | Self::MessageNotFound { .. }
                | Self::UserNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
