use async_trait::async_trait;
use mongodb::{bson::doc, Client, Collection};

use chatweave_types::{Chat, ChatId, ChatSettings};

use crate::dbs::mongo::models::MongoChat;
use crate::error::Result;
use crate::trait_client::ChatStore;

#[derive(Clone)]
pub struct MongoChatRepository {
    chats: Collection<MongoChat>,
    settings: Collection<ChatSettings>,
}

impl MongoChatRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self {
            chats: database.collection("chats"),
            settings: database.collection("chat_settings"),
        }
    }
}

#[async_trait]
impl ChatStore for MongoChatRepository {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Chat>> {
        Ok(self
            .chats
            .find_one(doc! { "_id": chat_id })
            .await?
            .map(Chat::from))
    }

    async fn save(&self, chat: &Chat) -> Result<()> {
        let document: MongoChat = chat.clone().into();
        self.chats
            .replace_one(doc! { "_id": chat.id }, document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get_settings(&self, chat_id: ChatId) -> Result<ChatSettings> {
        Ok(self
            .settings
            .find_one(doc! { "chat_id": chat_id })
            .await?
            .unwrap_or_else(|| ChatSettings::defaults_for(chat_id)))
    }

    async fn save_settings(&self, settings: &ChatSettings) -> Result<()> {
        self.settings
            .replace_one(doc! { "chat_id": settings.chat_id }, settings)
            .upsert(true)
            .await?;
        Ok(())
    }
}
