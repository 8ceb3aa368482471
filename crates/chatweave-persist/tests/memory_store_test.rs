use chatweave_persist::{PersistClient, PersistError};
use chatweave_types::{Chat, ChatSettings, Message, Thread, User};
use chrono::{Duration, Utc};

#[tokio::test]
async fn test_message_lookup_is_scoped_by_chat() {
    let persist = PersistClient::in_memory();
    let messages = persist.messages();

    messages.save(&Message::new(1, 100, 7, "in chat 100")).await.unwrap();
    messages.save(&Message::new(1, 200, 8, "in chat 200")).await.unwrap();

    assert_eq!(messages.get_by_id(100, 1).await.unwrap().text, "in chat 100");
    assert_eq!(messages.get_by_id(200, 1).await.unwrap().text, "in chat 200");

    let err = messages.get_by_id(100, 2).await.unwrap_err();
    assert!(matches!(err, PersistError::MessageNotFound { chat_id: 100, message_id: 2 }));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_messages_by_chat_are_oldest_first() {
    let persist = PersistClient::in_memory();
    let messages = persist.messages();
    let now = Utc::now();

    messages
        .save(&Message::new(2, 100, 7, "second").with_date(now))
        .await
        .unwrap();
    messages
        .save(&Message::new(1, 100, 7, "first").with_date(now - Duration::minutes(1)))
        .await
        .unwrap();

    let texts: Vec<String> = messages
        .get_by_chat(100)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn test_thread_lookup_by_member_message() {
    let persist = PersistClient::in_memory();
    let threads = persist.threads();
    let thread = Thread::new(100, "Hiking", "Weekend hike").with_first_message(5);
    threads.save(&thread).await.unwrap();

    let found = threads.get_by_message_id(100, 5).await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(thread.id.clone()));
    assert!(threads.get_by_message_id(100, 6).await.unwrap().is_none());
    assert!(threads.get_by_message_id(999, 5).await.unwrap().is_none());
}

#[tokio::test]
async fn test_active_threads_keep_creation_order() {
    let persist = PersistClient::in_memory();
    let threads = persist.threads();
    let first = Thread::new(100, "A", "a");
    let second = Thread::new(100, "B", "b");
    let other_chat = Thread::new(200, "C", "c");
    for thread in [&first, &second, &other_chat] {
        threads.save(thread).await.unwrap();
    }

    threads.deactivate(&first.id).await.unwrap();
    let active = threads.get_active_by_chat(100).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);

    let deactivated = threads.get_by_id(&first.id).await.unwrap();
    assert!(!deactivated.is_active);
}

#[tokio::test]
async fn test_update_unknown_thread_fails() {
    let persist = PersistClient::in_memory();
    let err = persist
        .threads()
        .update(&Thread::new(1, "x", "y"))
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::ThreadNotFound(_)));
}

#[tokio::test]
async fn test_chat_settings_default_when_absent() {
    let persist = PersistClient::in_memory();
    let chats = persist.chats();

    assert_eq!(chats.get_settings(42).await.unwrap().max_queue_size, 50);

    let mut settings = ChatSettings::defaults_for(42);
    settings.max_queue_size = 3;
    chats.save_settings(&settings).await.unwrap();
    assert_eq!(chats.get_settings(42).await.unwrap().max_queue_size, 3);
}

#[tokio::test]
async fn test_chat_roundtrip_keeps_queue() {
    let persist = PersistClient::in_memory();
    let chats = persist.chats();
    let mut chat = Chat::new(42).with_members([1, 2]);
    chat.reset_queue(Utc::now());
    chats.save(&chat).await.unwrap();

    let loaded = chats.get(42).await.unwrap().unwrap();
    assert_eq!(loaded.question_queue.len(), 2);
    assert!(chats.get(43).await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_store() {
    let persist = PersistClient::in_memory();
    let users = persist.users();
    let message = Message::new(1, 100, 7, "hi").with_author("Ada", "Lovelace", "ada");

    users.save(&User::from_message(&message)).await.unwrap();

    let user = users.get(7).await.unwrap().unwrap();
    assert_eq!(user.full_name(), "Ada Lovelace");
    assert!(users.get(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_builder_without_uri_uses_memory() {
    let persist = PersistClient::builder()
        .maybe_mongodb_uri(Some("  ".to_string()))
        .database("chatweave")
        .build()
        .await
        .unwrap();
    persist.messages().save(&Message::new(1, 1, 1, "ok")).await.unwrap();
}
