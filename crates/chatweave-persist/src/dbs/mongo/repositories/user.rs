use async_trait::async_trait;
use mongodb::{bson::doc, Client, Collection};

use chatweave_types::{User, UserId};

use crate::error::Result;
use crate::trait_client::UserStore;

#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserStore for MongoUserRepository {
    async fn get(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "id": user_id }).await?)
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.collection
            .replace_one(doc! { "id": user.id }, user)
            .upsert(true)
            .await?;
        Ok(())
    }
}
