//! Telegram Bot API: inbound update types and the outbound `sendMessage` client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatweave_engine::Delivery;
use chatweave_types::{ChatId, Message, MessageId};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

/// Telegram rejects longer texts. Measured in UTF-16 code units, as the Bot API counts.
pub const MAX_MESSAGE_UTF16: usize = 4096;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: MessageId,
    /// Unix seconds
    pub date: i64,
    pub chat: TgChat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<TgMessage>>,
    #[serde(default)]
    pub new_chat_members: Vec<TgUser>,
    #[serde(default)]
    pub left_chat_member: Option<TgUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: ChatId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl TgMessage {
    /// `None` for service messages and anything without text or author
    pub fn to_message(&self) -> Option<Message> {
        let text = self.text.as_deref().filter(|t| !t.trim().is_empty())?;
        let from = self.from.as_ref()?;

        let date = DateTime::<Utc>::from_timestamp(self.date, 0).unwrap_or_else(Utc::now);
        let mut message = Message::new(self.message_id, self.chat.id, from.id, text)
            .with_author(
                from.first_name.as_str(),
                from.last_name.as_deref().unwrap_or_default(),
                from.username.as_deref().unwrap_or_default(),
            )
            .with_date(date);
        if let Some(parent) = &self.reply_to_message {
            message = message.with_reply_to(parent.message_id);
        }
        if from.is_bot {
            message = message.automated();
        }
        Some(message)
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

/// Bot API client (HTTP direct, no SDK)
pub struct TelegramClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<MessageId> {
        let text = truncate_utf16(text, MAX_MESSAGE_UTF16);
        let response = self
            .http_client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body: ApiResponse<SentMessage> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram response ({})", status))?;

        match body.result {
            Some(sent) if body.ok => Ok(sent.message_id),
            _ => anyhow::bail!(
                "Telegram API error ({}): {}",
                status,
                body.description.unwrap_or_default()
            ),
        }
    }
}

/// Longest prefix of `text` that fits in `max_units` UTF-16 code units, never splitting a char
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}

#[async_trait]
impl Delivery for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId> {
        self.send_message(chat_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_to_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 1,
                "message": {
                    "message_id": 42,
                    "date": 1700000000,
                    "chat": {"id": -100, "type": "supergroup", "title": "Team"},
                    "from": {"id": 7, "is_bot": false, "first_name": "Ann", "username": "ann"},
                    "text": "hello",
                    "reply_to_message": {
                        "message_id": 41,
                        "date": 1699999999,
                        "chat": {"id": -100, "type": "supergroup"}
                    }
                }
            }"#,
        )
        .unwrap();

        let message = update.message.unwrap().to_message().unwrap();
        assert_eq!(message.id, 42);
        assert_eq!(message.chat_id, -100);
        assert_eq!(message.user_id, 7);
        assert_eq!(message.reply_to_message_id, Some(41));
        assert_eq!(message.username, "ann");
        assert_eq!(message.last_name, "");
        assert_eq!(message.date.timestamp(), 1700000000);
        assert!(!message.is_bot);
    }

    #[test]
    fn test_service_message_is_skipped() {
        let message: TgMessage = serde_json::from_str(
            r#"{
                "message_id": 3,
                "date": 1700000000,
                "chat": {"id": -100, "type": "group"},
                "from": {"id": 7, "first_name": "Ann"},
                "new_chat_members": [{"id": 8, "first_name": "Bob"}]
            }"#,
        )
        .unwrap();

        assert!(message.to_message().is_none());
        assert_eq!(message.new_chat_members.len(), 1);
    }

    #[test]
    fn test_truncate_counts_utf16_units() {
        assert_eq!(truncate_utf16("hello", 10), "hello");
        assert_eq!(truncate_utf16("hello", 3), "hel");

        // Each emoji is a surrogate pair
        let emoji = "\u{1F600}".repeat(3000);
        let cut = truncate_utf16(&emoji, MAX_MESSAGE_UTF16);
        assert_eq!(cut.chars().count(), 2048);
        assert_eq!(cut.encode_utf16().count(), MAX_MESSAGE_UTF16);

        // A pair that would straddle the limit is left out whole
        assert_eq!(truncate_utf16("ab\u{1F600}", 3), "ab");
    }

    #[test]
    fn test_bot_author_is_automated() {
        let message: TgMessage = serde_json::from_str(
            r#"{
                "message_id": 3,
                "date": 1700000000,
                "chat": {"id": 1, "type": "private"},
                "from": {"id": 9, "is_bot": true, "first_name": "Bot"},
                "text": "beep"
            }"#,
        )
        .unwrap();

        assert!(message.to_message().unwrap().is_bot);
    }
}
