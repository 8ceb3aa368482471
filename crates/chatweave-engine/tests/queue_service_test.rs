use std::sync::Arc;

use chatweave_engine::{EngineError, QueueService};
use chatweave_persist::InMemoryChatStore;
use chatweave_types::{ChatSettings, QueueError, QueueStatus};
use chrono::{Duration, Utc};

const CHAT: i64 = 1;

fn service() -> QueueService {
    QueueService::new(Arc::new(InMemoryChatStore::new()))
}

#[tokio::test]
async fn test_add_member_auto_enqueues_once() {
    let queue = service();
    assert!(queue.add_member(CHAT, 7).await.unwrap());
    assert!(!queue.add_member(CHAT, 7).await.unwrap());
    assert!(queue.add_member(CHAT, 8).await.unwrap());

    assert_eq!(queue.position(CHAT, 7).await.unwrap(), 0);
    assert_eq!(queue.position(CHAT, 8).await.unwrap(), 1);
    assert_eq!(queue.get_chat(CHAT).await.unwrap().user_ids, vec![7, 8]);
}

#[tokio::test]
async fn test_add_member_respects_settings() {
    let queue = service();
    let mut settings = ChatSettings::defaults_for(CHAT);
    settings.auto_enqueue_new_users = false;
    queue.save_settings(&settings).await.unwrap();

    assert!(queue.add_member(CHAT, 7).await.unwrap());
    assert!(queue.entries(CHAT).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_enqueue_user_checks_settings() {
    let queue = service();
    queue.ensure_chat(CHAT, "Book club").await.unwrap();

    let mut settings = ChatSettings::defaults_for(CHAT);
    settings.max_queue_size = 1;
    queue.save_settings(&settings).await.unwrap();

    assert!(queue.enqueue_user(CHAT, 7).await.unwrap());
    assert!(!queue.enqueue_user(CHAT, 7).await.unwrap());
    let err = queue.enqueue_user(CHAT, 8).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Queue(QueueError::QueueFull { max: 1, .. })
    ));

    settings.enable_question_rounds = false;
    queue.save_settings(&settings).await.unwrap();
    let err = queue.enqueue_user(CHAT, 9).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Queue(QueueError::QuestionRoundsDisabled(CHAT))
    ));
}

#[tokio::test]
async fn test_operations_on_unknown_entries_fail() {
    let queue = service();
    queue.add_member(CHAT, 7).await.unwrap();

    assert!(queue.mark_asked(CHAT, 99, "q").await.unwrap_err().is_not_found());
    assert!(queue.mark_answered(CHAT, 99).await.unwrap_err().is_not_found());
    assert!(queue.skip(CHAT, 99, "test").await.unwrap_err().is_not_found());
    assert!(queue.dequeue(CHAT, 99).await.unwrap_err().is_not_found());
    assert!(queue.next_waiting(2).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_dequeue_then_position_not_found() {
    let queue = service();
    queue.add_member(CHAT, 7).await.unwrap();
    queue.add_member(CHAT, 8).await.unwrap();

    queue.dequeue(CHAT, 7).await.unwrap();
    assert!(queue.position(CHAT, 7).await.unwrap_err().is_not_found());
    assert_eq!(queue.position(CHAT, 8).await.unwrap(), 0);
}

#[tokio::test]
async fn test_remove_member_leaves_queue() {
    let queue = service();
    queue.add_member(CHAT, 7).await.unwrap();
    queue.add_member(CHAT, 8).await.unwrap();

    queue.remove_member(CHAT, 7).await.unwrap();
    let chat = queue.get_chat(CHAT).await.unwrap();
    assert_eq!(chat.user_ids, vec![8]);
    assert_eq!(chat.question_queue.len(), 1);
    assert_eq!(chat.question_queue[0].position, 0);
}

#[tokio::test]
async fn test_remove_member_never_queued() {
    let queue = service();
    let mut settings = ChatSettings::defaults_for(CHAT);
    settings.auto_enqueue_new_users = false;
    queue.save_settings(&settings).await.unwrap();
    queue.add_member(CHAT, 7).await.unwrap();

    queue.remove_member(CHAT, 7).await.unwrap();
    let chat = queue.get_chat(CHAT).await.unwrap();
    assert!(chat.user_ids.is_empty());
    assert!(chat.question_queue.is_empty());
}

#[tokio::test]
async fn test_reset_and_clear() {
    let queue = service();
    for user in [7, 8, 9] {
        queue.add_member(CHAT, user).await.unwrap();
    }
    queue.mark_asked(CHAT, 7, "q1").await.unwrap();
    queue.mark_answered(CHAT, 7).await.unwrap();
    queue.skip(CHAT, 8, "test").await.unwrap();

    assert_eq!(queue.clear_completed(CHAT).await.unwrap(), 2);
    assert_eq!(queue.next_waiting(CHAT).await.unwrap().user_id, 9);

    let entries = queue.reset_queue(CHAT).await.unwrap();
    let users: Vec<_> = entries.iter().map(|e| (e.user_id, e.position)).collect();
    assert_eq!(users, vec![(7, 0), (8, 1), (9, 2)]);
    assert!(entries.iter().all(|e| e.status == QueueStatus::Waiting));
}

#[tokio::test]
async fn test_expire_stale_asking_skips_after_timeout() {
    let queue = service();
    queue.add_member(CHAT, 7).await.unwrap();
    queue.add_member(CHAT, 8).await.unwrap();
    queue.mark_asked(CHAT, 7, "q1").await.unwrap();

    let now = Utc::now();
    assert!(queue.expire_stale_asking(CHAT, now).await.unwrap().is_empty());

    let later = now + Duration::hours(3);
    assert_eq!(queue.expire_stale_asking(CHAT, later).await.unwrap(), vec![7]);
    let entry = queue.entry(CHAT, 7).await.unwrap().unwrap();
    assert_eq!(entry.status, QueueStatus::Skipped);
    assert_eq!(queue.get_chat(CHAT).await.unwrap().updated_at, later);
    assert_eq!(queue.next_waiting(CHAT).await.unwrap().user_id, 8);
}

#[tokio::test]
async fn test_expire_disabled_by_settings() {
    let queue = service();
    queue.add_member(CHAT, 7).await.unwrap();
    queue.mark_asked(CHAT, 7, "q1").await.unwrap();

    let mut settings = ChatSettings::defaults_for(CHAT);
    settings.skip_inactive_users = false;
    queue.save_settings(&settings).await.unwrap();

    let later = Utc::now() + Duration::days(2);
    assert!(queue.expire_stale_asking(CHAT, later).await.unwrap().is_empty());
    assert_eq!(
        queue.entry(CHAT, 7).await.unwrap().map(|e| e.status),
        Some(QueueStatus::Asking)
    );
}

#[tokio::test]
async fn test_ensure_chat_preserves_members() {
    let queue = service();
    queue.add_member(CHAT, 7).await.unwrap();

    let chat = queue.ensure_chat(CHAT, "Renamed").await.unwrap();
    assert_eq!(chat.title, "Renamed");
    assert_eq!(chat.user_ids, vec![7]);
    assert_eq!(chat.question_queue.len(), 1);
}
