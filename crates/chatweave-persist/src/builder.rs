use crate::client::PersistClient;
use crate::error::{PersistError, Result};

pub struct PersistClientBuilder {
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    /// Like [`Self::mongodb_uri`], ignoring empty values
    pub fn maybe_mongodb_uri(mut self, uri: Option<String>) -> Self {
        self.mongodb_uri = uri.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    /// MongoDB when a URI was given, in-memory stores otherwise
    pub async fn build(self) -> Result<PersistClient> {
        let Some(uri) = self.mongodb_uri else {
            tracing::warn!("No MongoDB URI configured, using in-memory stores");
            return Ok(PersistClient::in_memory());
        };
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        Self::connect_mongo(&uri, &database).await
    }

    #[cfg(feature = "mongodb")]
    async fn connect_mongo(uri: &str, database: &str) -> Result<PersistClient> {
        crate::dbs::mongo::MongoPersistenceClient::connect(uri, database).await
    }

    #[cfg(not(feature = "mongodb"))]
    async fn connect_mongo(_uri: &str, _database: &str) -> Result<PersistClient> {
        Err(PersistError::Connection(
            "built without the mongodb feature".to_string(),
        ))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
