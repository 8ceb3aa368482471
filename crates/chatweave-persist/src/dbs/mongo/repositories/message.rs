use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use chatweave_types::{ChatId, Message, MessageId};

use crate::error::{PersistError, Result};
use crate::trait_client::MessageStore;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<Message>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }
}

#[async_trait]
impl MessageStore for MongoMessageRepository {
    async fn save(&self, message: &Message) -> Result<()> {
        let filter = doc! { "chat_id": message.chat_id, "id": message.id };
        self.collection
            .replace_one(filter, message)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, chat_id: ChatId, message_id: MessageId) -> Result<Message> {
        let filter = doc! { "chat_id": chat_id, "id": message_id };
        self.collection
            .find_one(filter)
            .await?
            .ok_or(PersistError::MessageNotFound {
                chat_id,
                message_id,
            })
    }

    async fn get_by_chat(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        let messages = self
            .collection
            .find(doc! { "chat_id": chat_id })
            .sort(doc! { "date": 1, "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }
}
