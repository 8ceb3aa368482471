use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chatweave_llm::{GenerateRequest, TextGenerator};
use chatweave_types::{ChatId, User, UserId};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::{Evaluation, ResponseStrategy, StrategyContext};
use crate::error::Result;
use crate::prompts::{self, purpose};
use crate::queue::QueueService;
use crate::users::{truncate_chars, UserService};

const MAX_QUESTION_CHARS: usize = 300;

/// A question addressed to one queued member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionPrompt {
    pub user_id: UserId,
    pub question_id: String,
    pub text: String,
}

/// Drives question rounds. Never competes in arbitration; rounds are triggered out of band
/// through [`QuestionStrategy::ask_next_user`].
pub struct QuestionStrategy {
    generator: Arc<dyn TextGenerator>,
    users: UserService,
    queue: QueueService,
}

impl QuestionStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, users: UserService, queue: QueueService) -> Self {
        Self {
            generator,
            users,
            queue,
        }
    }

    /// Ask the first waiting member a personalised question and mark them `asking`.
    /// `None` when nobody is waiting.
    pub async fn ask_next_user(&self, chat_id: ChatId) -> Result<Option<QuestionPrompt>> {
        let now = Utc::now();
        self.queue.expire_stale_asking(chat_id, now).await?;

        let entry = match self.queue.next_waiting(chat_id).await {
            Ok(entry) => entry,
            Err(e) if e.is_not_found() => {
                info!(chat_id, "No users in question queue");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let user_id = entry.user_id;

        let user = self.users.get_user(user_id).await?;
        let text = self.generate_question(user_id, user.as_ref()).await;

        let question_id = format!("q_{}_{}_{}", user_id, chat_id, now.timestamp());
        self.queue.mark_asked(chat_id, user_id, &question_id).await?;
        info!(chat_id, user_id, question_id = %question_id, "Asked queued user");

        Ok(Some(QuestionPrompt {
            user_id,
            question_id,
            text,
        }))
    }

    /// Falls back to a generic question when the backend is unavailable
    async fn generate_question(&self, user_id: UserId, user: Option<&User>) -> String {
        let summary = user.map(UserService::profile_summary).unwrap_or_default();
        let request = GenerateRequest::new(
            purpose::USER_QUESTION,
            prompts::user_question_prompt(user, &summary),
        )
        .with_system_instruction(
            "Generate an engaging, conversational question. At most 300 characters.",
        );

        match self.generator.generate_content(request).await {
            Ok(text) if !text.trim().is_empty() => truncate_chars(text.trim(), MAX_QUESTION_CHARS),
            Ok(_) => fallback_question(user_id, user),
            Err(e) => {
                warn!(user_id, "Question generation failed, using fallback: {}", e);
                fallback_question(user_id, user)
            }
        }
    }
}

fn fallback_question(user_id: UserId, user: Option<&User>) -> String {
    let name = user
        .map(|u| u.first_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("user {}", user_id));
    format!("{}, what has been keeping you busy lately?", name)
}

#[async_trait]
impl ResponseStrategy for QuestionStrategy {
    fn name(&self) -> &str {
        "question"
    }

    fn priority(&self) -> u8 {
        90
    }

    async fn should_respond(&self, _ctx: &StrategyContext<'_>) -> AnyResult<Evaluation> {
        Ok(Evaluation::pass())
    }

    async fn generate_response(&self, _ctx: &StrategyContext<'_>) -> AnyResult<String> {
        Ok(String::new())
    }
}
