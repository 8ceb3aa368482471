use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatweave_llm::{generate_structured, GenerateRequest, StructuredError, TextGenerator};
use chatweave_types::{Message, UserInformation};
use regex::Regex;
use tracing::{debug, info, warn};

use super::{Evaluation, ResponseStrategy, StrategyContext};
use crate::prompts::{self, purpose};
use crate::users::{truncate_chars, UserService};

const KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "i am",
    "i'm",
    "my name is",
    "call me",
    "about me",
    "introduce myself",
    "introduction",
    "i like",
    "i love",
    "i enjoy",
    "i'm into",
    "my hobbies",
    "my interests",
    "passionate about",
    "i work",
    "i study",
    "i do",
    "profession",
    "nice to meet",
    "pleased to meet",
    "good to meet",
];

const SELF_DISCLOSURE: &[&str] = &[
    r"\bi\s+(am|'m)\s+",
    r"\bmy\s+(name|hobbies|interests)\s+",
    r"\bi\s+(like|love|enjoy|work|study|do)\s+",
];

const KEYWORD_WEIGHT: f64 = 0.2;
const PATTERN_WEIGHT: f64 = 0.3;
const LENGTH_BONUS: f64 = 0.2;
const LONG_MESSAGE_CHARS: usize = 50;
const MAX_CONFIDENCE: f64 = 0.95;
const THRESHOLD: f64 = 0.4;
const MAX_REPLY_CHARS: usize = 300;

/// Detects self-introductions, records what the author shared and welcomes them
pub struct IntroductionStrategy {
    generator: Arc<dyn TextGenerator>,
    users: UserService,
    patterns: Vec<Regex>,
}

impl IntroductionStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, users: UserService) -> Self {
        let patterns = SELF_DISCLOSURE
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self {
            generator,
            users,
            patterns,
        }
    }

    /// Local heuristic score in [0, 0.95]
    pub fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let keywords = KEYWORDS.iter().filter(|k| lowered.contains(*k)).count() as f64;
        let patterns = self.patterns.iter().filter(|p| p.is_match(&lowered)).count() as f64;

        let mut score = keywords * KEYWORD_WEIGHT + patterns * PATTERN_WEIGHT;
        if text.chars().count() > LONG_MESSAGE_CHARS {
            score += LENGTH_BONUS;
        }
        score.min(MAX_CONFIDENCE)
    }

    async fn extract_information(&self, message: &Message) -> Result<UserInformation> {
        let request = GenerateRequest::new(
            purpose::USER_INFORMATION,
            prompts::user_information_prompt(message),
        )
        .with_system_instruction(
            "Extract user information as JSON. Only use explicitly mentioned facts.",
        )
        .with_schema(prompts::user_information_schema());

        match generate_structured::<UserInformation>(self.generator.as_ref(), request).await {
            Ok(info) => Ok(info),
            Err(StructuredError::Backend(e)) => Err(e.context("user information extraction failed")),
            Err(e) => {
                warn!(user_id = message.user_id, "Unreadable user information: {}", e);
                Ok(UserInformation::default())
            }
        }
    }

    async fn record_profile(&self, message: &Message, info: &UserInformation) {
        if let Err(e) = self.users.track_user(message).await {
            warn!(user_id = message.user_id, "Failed to track user: {}", e);
            return;
        }
        if info.is_empty() {
            return;
        }
        match self.users.update_profile(message.user_id, info).await {
            Ok(user) => info!(
                user_id = user.id,
                interests = user.interests.len(),
                hobbies = user.hobbies.len(),
                "Updated user profile"
            ),
            Err(e) => warn!(user_id = message.user_id, "Failed to update profile: {}", e),
        }
    }
}

#[async_trait]
impl ResponseStrategy for IntroductionStrategy {
    fn name(&self) -> &str {
        "introduction"
    }

    fn priority(&self) -> u8 {
        80
    }

    async fn should_respond(&self, ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        let confidence = self.score(&ctx.message.text);
        debug!(confidence, "Introduction detection");
        Ok(Evaluation::new(confidence >= THRESHOLD, confidence))
    }

    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String> {
        let info = self.extract_information(ctx.message).await?;
        self.record_profile(ctx.message, &info).await;

        let request = GenerateRequest::new(
            purpose::INTRODUCTION_CONFIRMATION,
            prompts::introduction_confirmation_prompt(ctx.message, &info),
        )
        .with_system_instruction("Write a warm, concise and personal welcome.");
        let text = self
            .generator
            .generate_content(request)
            .await
            .context("introduction confirmation failed")?;
        Ok(truncate_chars(text.trim(), MAX_REPLY_CHARS))
    }
}
