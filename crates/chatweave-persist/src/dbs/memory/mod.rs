mod stores;

pub use stores::{InMemoryChatStore, InMemoryMessageStore, InMemoryThreadStore, InMemoryUserStore};
