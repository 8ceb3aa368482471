//! Per-chat question queue.
//!
//! Entries move `waiting -> asking -> completed` or `waiting -> skipped`. The transitions
//! below are pure: they mutate the in-memory [`Chat`] aggregate and never touch storage.
//! When a user has several entries (e.g. a completed one not yet cleared plus a fresh
//! waiting one), per-user operations act on the most recent entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::Chat;
use crate::message::{ChatId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Waiting,
    Asking,
    Completed,
    Skipped,
}

impl QueueStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub user_id: UserId,
    /// Index in the chat's queue, kept dense by removals and resets
    pub position: usize,
    pub enqueued_at: DateTime<Utc>,
    pub status: QueueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
}

impl QueueEntry {
    pub fn waiting(user_id: UserId, position: usize, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            position,
            enqueued_at: now,
            status: QueueStatus::Waiting,
            question_id: None,
            asked_at: None,
            answered_at: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueueError {
    #[error("No queue entry for user {user_id} in chat {chat_id}")]
    EntryNotFound { chat_id: ChatId, user_id: UserId },

    #[error("No waiting users in chat {0}")]
    NoWaitingUsers(ChatId),

    #[error("Question rounds are disabled for chat {0}")]
    QuestionRoundsDisabled(ChatId),

    #[error("Queue for chat {chat_id} is full ({max} waiting)")]
    QueueFull { chat_id: ChatId, max: usize },
}

impl QueueError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. } | Self::NoWaitingUsers(_))
    }
}

impl Chat {
    /// Appends a waiting entry. No-op (returns false) while the user already has a
    /// waiting or asking entry.
    pub fn enqueue(&mut self, user_id: UserId, now: DateTime<Utc>) -> bool {
        let active = self.question_queue.iter().any(|e| {
            e.user_id == user_id && matches!(e.status, QueueStatus::Waiting | QueueStatus::Asking)
        });
        if active {
            return false;
        }
        let position = self.question_queue.len();
        self.question_queue
            .push(QueueEntry::waiting(user_id, position, now));
        self.updated_at = now;
        true
    }

    /// Removes every entry of the user and renumbers the rest
    pub fn dequeue(&mut self, user_id: UserId) -> Result<(), QueueError> {
        let before = self.question_queue.len();
        self.question_queue.retain(|e| e.user_id != user_id);
        if self.question_queue.len() == before {
            return Err(self.not_found(user_id));
        }
        self.renumber();
        Ok(())
    }

    /// First waiting entry in queue order
    pub fn next_waiting(&self) -> Result<&QueueEntry, QueueError> {
        self.question_queue
            .iter()
            .find(|e| e.status == QueueStatus::Waiting)
            .ok_or(QueueError::NoWaitingUsers(self.id))
    }

    pub fn mark_asked(
        &mut self,
        user_id: UserId,
        question_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let entry = self.entry_mut(user_id)?;
        entry.status = QueueStatus::Asking;
        entry.asked_at = Some(now);
        entry.question_id = Some(question_id.into());
        self.updated_at = now;
        Ok(())
    }

    /// Last write wins: answering twice keeps `completed` and the later timestamp
    pub fn mark_answered(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<(), QueueError> {
        let entry = self.entry_mut(user_id)?;
        entry.status = QueueStatus::Completed;
        entry.answered_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn skip(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<(), QueueError> {
        let entry = self.entry_mut(user_id)?;
        entry.status = QueueStatus::Skipped;
        self.updated_at = now;
        Ok(())
    }

    /// Drops completed and skipped entries. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.question_queue.len();
        self.question_queue.retain(|e| !e.status.is_terminal());
        self.renumber();
        before - self.question_queue.len()
    }

    /// Rebuilds the queue with one waiting entry per member, in membership order
    pub fn reset_queue(&mut self, now: DateTime<Utc>) {
        self.question_queue = self
            .user_ids
            .iter()
            .enumerate()
            .map(|(position, user_id)| QueueEntry::waiting(*user_id, position, now))
            .collect();
        self.updated_at = now;
    }

    /// Rank among waiting entries only
    pub fn position(&self, user_id: UserId) -> Result<usize, QueueError> {
        self.question_queue
            .iter()
            .filter(|e| e.status == QueueStatus::Waiting)
            .position(|e| e.user_id == user_id)
            .ok_or_else(|| self.not_found(user_id))
    }

    pub fn waiting_count(&self) -> usize {
        self.question_queue
            .iter()
            .filter(|e| e.status == QueueStatus::Waiting)
            .count()
    }

    pub fn queue_entry(&self, user_id: UserId) -> Option<&QueueEntry> {
        self.question_queue.iter().rev().find(|e| e.user_id == user_id)
    }

    /// Users stuck in `asking` since before `now - timeout`
    pub fn stale_asking(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<UserId> {
        self.question_queue
            .iter()
            .filter(|e| e.status == QueueStatus::Asking)
            .filter(|e| e.asked_at.map_or(true, |asked| now - asked > timeout))
            .map(|e| e.user_id)
            .collect()
    }

    fn entry_mut(&mut self, user_id: UserId) -> Result<&mut QueueEntry, QueueError> {
        let chat_id = self.id;
        self.question_queue
            .iter_mut()
            .rev()
            .find(|e| e.user_id == user_id)
            .ok_or(QueueError::EntryNotFound { chat_id, user_id })
    }

    fn not_found(&self, user_id: UserId) -> QueueError {
        QueueError::EntryNotFound {
            chat_id: self.id,
            user_id,
        }
    }

    fn renumber(&mut self) {
        for (position, entry) in self.question_queue.iter_mut().enumerate() {
            entry.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_with_queue(users: &[UserId]) -> Chat {
        let mut chat = Chat::new(100);
        let now = Utc::now();
        for user in users {
            chat.enqueue(*user, now);
        }
        chat
    }

    #[test]
    fn test_positions_follow_enqueue_order() {
        let chat = chat_with_queue(&[1, 2, 3, 4]);
        let positions: Vec<usize> = [1, 2, 3, 4]
            .iter()
            .map(|u| chat.position(*u).unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_position_excludes_non_waiting_entries() {
        let mut chat = chat_with_queue(&[1, 2, 3, 4]);
        let now = Utc::now();
        chat.mark_asked(1, "q1", now).unwrap();
        chat.mark_answered(2, now).unwrap();
        chat.skip(3, now).unwrap();

        assert_eq!(chat.position(4).unwrap(), 0);
        assert!(chat.position(1).is_err());
        assert!(chat.position(2).is_err());
        assert!(chat.position(3).is_err());
    }

    #[test]
    fn test_enqueue_is_idempotent_for_waiting_user() {
        let mut chat = chat_with_queue(&[1]);
        assert!(!chat.enqueue(1, Utc::now()));
        assert_eq!(chat.question_queue.len(), 1);
    }

    #[test]
    fn test_enqueue_does_not_duplicate_asking_user() {
        let mut chat = chat_with_queue(&[1]);
        chat.mark_asked(1, "q1", Utc::now()).unwrap();
        assert!(!chat.enqueue(1, Utc::now()));
        assert_eq!(chat.question_queue.len(), 1);
    }

    #[test]
    fn test_enqueue_after_completion_appends_new_entry() {
        let mut chat = chat_with_queue(&[1, 2]);
        chat.mark_answered(1, Utc::now()).unwrap();

        assert!(chat.enqueue(1, Utc::now()));
        assert_eq!(chat.question_queue.len(), 3);
        assert_eq!(chat.question_queue[2].position, 2);
        assert_eq!(chat.position(1).unwrap(), 1);
    }

    #[test]
    fn test_dequeue_then_position_is_not_found() {
        let mut chat = chat_with_queue(&[1, 2, 3]);
        chat.dequeue(2).unwrap();

        assert_eq!(
            chat.position(2),
            Err(QueueError::EntryNotFound {
                chat_id: 100,
                user_id: 2
            })
        );
    }

    #[test]
    fn test_dequeue_renumbers_densely() {
        let mut chat = chat_with_queue(&[1, 2, 3]);
        chat.dequeue(1).unwrap();

        let entries: Vec<(UserId, usize)> = chat
            .question_queue
            .iter()
            .map(|e| (e.user_id, e.position))
            .collect();
        assert_eq!(entries, vec![(2, 0), (3, 1)]);
    }

    #[test]
    fn test_dequeue_unknown_user_fails() {
        let mut chat = chat_with_queue(&[1]);
        assert!(chat.dequeue(9).unwrap_err().is_not_found());
    }

    #[test]
    fn test_next_waiting_is_fifo() {
        let mut chat = chat_with_queue(&[5, 6, 7]);
        assert_eq!(chat.next_waiting().unwrap().user_id, 5);

        chat.mark_asked(5, "q5", Utc::now()).unwrap();
        assert_eq!(chat.next_waiting().unwrap().user_id, 6);
    }

    #[test]
    fn test_next_waiting_on_empty_queue() {
        let chat = Chat::new(3);
        assert_eq!(chat.next_waiting(), Err(QueueError::NoWaitingUsers(3)));
    }

    #[test]
    fn test_mark_asked_requires_entry() {
        let mut chat = Chat::new(3);
        let err = chat.mark_asked(1, "q", Utc::now()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_mark_asked_records_question() {
        let mut chat = chat_with_queue(&[1]);
        let now = Utc::now();
        chat.mark_asked(1, "q_1_100", now).unwrap();

        let entry = chat.queue_entry(1).unwrap();
        assert_eq!(entry.status, QueueStatus::Asking);
        assert_eq!(entry.question_id.as_deref(), Some("q_1_100"));
        assert_eq!(entry.asked_at, Some(now));
    }

    #[test]
    fn test_mark_answered_twice_is_last_write_wins() {
        let mut chat = chat_with_queue(&[1]);
        let first = Utc::now();
        let second = first + Duration::seconds(30);

        chat.mark_answered(1, first).unwrap();
        chat.mark_answered(1, second).unwrap();

        let entry = chat.queue_entry(1).unwrap();
        assert_eq!(entry.status, QueueStatus::Completed);
        assert_eq!(entry.answered_at, Some(second));
    }

    #[test]
    fn test_skip_requires_entry() {
        let mut chat = chat_with_queue(&[1]);
        let now = Utc::now() + Duration::minutes(5);
        assert!(chat.skip(2, now).is_err());
        chat.skip(1, now).unwrap();
        assert_eq!(chat.queue_entry(1).unwrap().status, QueueStatus::Skipped);
        assert_eq!(chat.updated_at, now);
    }

    #[test]
    fn test_clear_completed_keeps_waiting_and_asking() {
        let mut chat = chat_with_queue(&[1, 2, 3, 4]);
        let now = Utc::now();
        chat.mark_answered(1, now).unwrap();
        chat.mark_asked(2, "q2", now).unwrap();
        chat.skip(3, now).unwrap();

        assert_eq!(chat.clear_completed(), 2);
        let entries: Vec<(UserId, usize, QueueStatus)> = chat
            .question_queue
            .iter()
            .map(|e| (e.user_id, e.position, e.status))
            .collect();
        assert_eq!(
            entries,
            vec![(2, 0, QueueStatus::Asking), (4, 1, QueueStatus::Waiting)]
        );
    }

    #[test]
    fn test_reset_queue_rebuilds_from_members() {
        let mut chat = Chat::new(1).with_members([7, 8, 9]);
        chat.enqueue(42, Utc::now());
        chat.enqueue(8, Utc::now());
        chat.mark_answered(8, Utc::now()).unwrap();

        chat.reset_queue(Utc::now());

        let entries: Vec<(UserId, usize, QueueStatus)> = chat
            .question_queue
            .iter()
            .map(|e| (e.user_id, e.position, e.status))
            .collect();
        assert_eq!(
            entries,
            vec![
                (7, 0, QueueStatus::Waiting),
                (8, 1, QueueStatus::Waiting),
                (9, 2, QueueStatus::Waiting),
            ]
        );
    }

    #[test]
    fn test_stale_asking_uses_timeout() {
        let mut chat = chat_with_queue(&[1, 2]);
        let now = Utc::now();
        chat.mark_asked(1, "q1", now - Duration::hours(3)).unwrap();
        chat.mark_asked(2, "q2", now - Duration::minutes(10)).unwrap();

        assert_eq!(chat.stale_asking(now, Duration::hours(2)), vec![1]);
    }
}
