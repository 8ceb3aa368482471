use std::sync::Arc;

use crate::dbs::memory::{
    InMemoryChatStore, InMemoryMessageStore, InMemoryThreadStore, InMemoryUserStore,
};
use crate::trait_client::{ChatStore, MessageStore, ThreadStore, UserStore};

/// Handles to every store the engine needs
#[derive(Clone)]
pub struct PersistClient {
    messages: Arc<dyn MessageStore>,
    threads: Arc<dyn ThreadStore>,
    chats: Arc<dyn ChatStore>,
    users: Arc<dyn UserStore>,
}

impl PersistClient {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        threads: Arc<dyn ThreadStore>,
        chats: Arc<dyn ChatStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            messages,
            threads,
            chats,
            users,
        }
    }

    /// Process-local stores; state is lost on restart
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(InMemoryThreadStore::new()),
            Arc::new(InMemoryChatStore::new()),
            Arc::new(InMemoryUserStore::new()),
        )
    }

    pub fn builder() -> crate::builder::PersistClientBuilder {
        crate::builder::PersistClientBuilder::new()
    }

    pub fn messages(&self) -> Arc<dyn MessageStore> {
        Arc::clone(&self.messages)
    }

    pub fn threads(&self) -> Arc<dyn ThreadStore> {
        Arc::clone(&self.threads)
    }

    pub fn chats(&self) -> Arc<dyn ChatStore> {
        Arc::clone(&self.chats)
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }
}
