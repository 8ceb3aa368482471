pub mod builder;
pub mod client;
pub mod dbs;
pub mod error;
pub mod trait_client;

pub use builder::PersistClientBuilder;
pub use client::PersistClient;
pub use dbs::memory::{
    InMemoryChatStore, InMemoryMessageStore, InMemoryThreadStore, InMemoryUserStore,
};
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
pub use error::{PersistError, Result};
pub use trait_client::{ChatStore, MessageStore, ThreadStore, UserStore};
