use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use chatweave_types::{ChatId, MessageId, Thread};

use crate::dbs::mongo::models::MongoThread;
use crate::error::{PersistError, Result};
use crate::trait_client::ThreadStore;

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }
}

#[async_trait]
impl ThreadStore for MongoThreadRepository {
    async fn save(&self, thread: &Thread) -> Result<()> {
        let document: MongoThread = thread.clone().into();
        self.collection
            .replace_one(doc! { "_id": thread.id.as_str() }, document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, thread_id: &str) -> Result<Thread> {
        self.collection
            .find_one(doc! { "_id": thread_id })
            .await?
            .map(Thread::from)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn get_by_message_id(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<Option<Thread>> {
        let filter = doc! { "chat_id": chat_id, "message_ids": message_id };
        Ok(self.collection.find_one(filter).await?.map(Thread::from))
    }

    async fn get_active_by_chat(&self, chat_id: ChatId) -> Result<Vec<Thread>> {
        let threads: Vec<MongoThread> = self
            .collection
            .find(doc! { "chat_id": chat_id, "is_active": true })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads.into_iter().map(Thread::from).collect())
    }

    async fn update(&self, thread: &Thread) -> Result<()> {
        let document: MongoThread = thread.clone().into();
        let result = self
            .collection
            .replace_one(doc! { "_id": thread.id.as_str() }, document)
            .await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(thread.id.clone()));
        }
        Ok(())
    }

    async fn deactivate(&self, thread_id: &str) -> Result<()> {
        let mut thread = self.get_by_id(thread_id).await?;
        thread.deactivate();
        self.update(&thread).await
    }
}
