use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatweave_llm::{parse_json, GenerateRequest, TextGenerator};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{find_keyword, Evaluation, ResponseStrategy, StrategyContext};
use crate::prompts::{self, purpose};

const KEYWORDS: &[&str] = &[
    "remind",
    "deadline",
    "tomorrow",
    "next week",
    "don't forget",
    "remember",
    "напомни",
    "завтра",
    "не забудь",
    "срок",
];
const KEYWORD_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Deserialize)]
struct Reminders {
    #[serde(default)]
    reminders: Vec<Reminder>,
}

#[derive(Debug, Deserialize)]
struct Reminder {
    #[serde(default)]
    person: String,
    action: String,
    #[serde(default)]
    deadline: String,
    #[serde(default)]
    priority: String,
}

/// Tracks commitments and deadlines
pub struct ReminderStrategy {
    generator: Arc<dyn TextGenerator>,
}

impl ReminderStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ResponseStrategy for ReminderStrategy {
    fn name(&self) -> &str {
        "reminder"
    }

    fn priority(&self) -> u8 {
        70
    }

    async fn should_respond(&self, ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        Ok(match find_keyword(&ctx.message.text, KEYWORDS) {
            Some(keyword) => {
                debug!(keyword, "Reminder keyword detected");
                Evaluation::respond(KEYWORD_CONFIDENCE)
            }
            None => Evaluation::pass(),
        })
    }

    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String> {
        let request = GenerateRequest::new(
            purpose::REMINDERS,
            prompts::reminders_prompt(ctx.history(), ctx.message),
        )
        .with_schema(prompts::reminders_schema());

        let raw = self
            .generator
            .generate_content(request)
            .await
            .context("reminder extraction failed")?;

        match parse_json::<Reminders>(&raw) {
            Ok(parsed) => Ok(format_reminders(&parsed.reminders)),
            Err(e) => {
                warn!("Unstructured reminder reply: {}", e);
                Ok(format!("⏰ Reminder noted:\n{}", raw.trim()))
            }
        }
    }
}

fn format_reminders(reminders: &[Reminder]) -> String {
    if reminders.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = reminders
        .iter()
        .map(|r| {
            let icon = if r.priority.eq_ignore_ascii_case("high") {
                "🔥"
            } else {
                "📌"
            };
            let mut line = format!("{} ", icon);
            if !r.person.is_empty() {
                line.push_str(&r.person);
                line.push_str(": ");
            }
            line.push_str(&r.action);
            if !r.deadline.is_empty() {
                line.push_str(&format!(" (by {})", r.deadline));
            }
            line
        })
        .collect();
    format!("⏰ Reminders tracked:\n\n{}", lines.join("\n"))
}
