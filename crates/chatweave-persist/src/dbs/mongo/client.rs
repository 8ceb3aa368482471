use mongodb::Client;
use std::sync::Arc;

use crate::client::PersistClient;
use crate::dbs::mongo::repositories::{
    MongoChatRepository, MongoMessageRepository, MongoThreadRepository, MongoUserRepository,
};
use crate::error::{PersistError, Result};

pub struct MongoPersistenceClient;

impl MongoPersistenceClient {
    /// Connect to MongoDB and wire one repository per collection
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<PersistClient> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!("Connected to MongoDB database {}", database);

        Ok(PersistClient::new(
            Arc::new(MongoMessageRepository::new(&client, database)),
            Arc::new(MongoThreadRepository::new(&client, database)),
            Arc::new(MongoChatRepository::new(&client, database)),
            Arc::new(MongoUserRepository::new(&client, database)),
        ))
    }
}
