pub mod chat;
pub mod message;
pub mod thread;
pub mod user;

pub use chat::MongoChatRepository;
pub use message::MongoMessageRepository;
pub use thread::MongoThreadRepository;
pub use user::MongoUserRepository;
