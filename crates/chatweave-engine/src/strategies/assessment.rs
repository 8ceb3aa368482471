use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chatweave_llm::{generate_structured, GenerateRequest, StructuredError, TextGenerator};
use chatweave_types::QueueStatus;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{Evaluation, ResponseStrategy, StrategyContext};
use crate::prompts::{self, purpose};
use crate::queue::QueueService;

#[derive(Debug, Deserialize)]
struct AssessmentNeeded {
    should_respond: bool,
    confidence: f64,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct Assessment {
    score: f64,
    feedback: String,
    #[serde(default)]
    follow_up_needed: bool,
    #[serde(default)]
    follow_up_question: String,
}

/// Gives feedback on answers to questions asked during a question round.
///
/// Only users whose queue entry is `asking` are considered.
pub struct AssessmentStrategy {
    generator: Arc<dyn TextGenerator>,
    queue: QueueService,
}

impl AssessmentStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, queue: QueueService) -> Self {
        Self { generator, queue }
    }
}

#[async_trait]
impl ResponseStrategy for AssessmentStrategy {
    fn name(&self) -> &str {
        "assessment"
    }

    fn priority(&self) -> u8 {
        85
    }

    async fn should_respond(&self, ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        let entry = self
            .queue
            .entry(ctx.message.chat_id, ctx.message.user_id)
            .await?;
        if entry.map(|e| e.status) != Some(QueueStatus::Asking) {
            return Ok(Evaluation::pass());
        }

        let request = GenerateRequest::new(
            purpose::ASSESSMENT_NEEDED,
            prompts::assessment_needed_prompt(ctx.history(), ctx.message),
        )
        .with_schema(prompts::assessment_needed_schema());

        match generate_structured::<AssessmentNeeded>(self.generator.as_ref(), request).await {
            Ok(result) => {
                debug!(
                    should_respond = result.should_respond,
                    confidence = result.confidence,
                    reason = %result.reason,
                    "Assessment evaluation"
                );
                Ok(Evaluation::new(result.should_respond, result.confidence))
            }
            Err(StructuredError::Backend(e)) => Err(e.context("assessment evaluation failed")),
            Err(e) => {
                warn!("Unreadable assessment evaluation: {}", e);
                Ok(Evaluation::pass())
            }
        }
    }

    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String> {
        let (chat_id, user_id) = (ctx.message.chat_id, ctx.message.user_id);
        match self.queue.mark_answered(chat_id, user_id).await {
            Ok(()) => info!(chat_id, user_id, "Question answered"),
            Err(e) => warn!(chat_id, user_id, "Failed to mark question answered: {}", e),
        }

        let request = GenerateRequest::new(
            purpose::ASSESSMENT,
            prompts::assessment_prompt(ctx.history(), ctx.message),
        )
        .with_schema(prompts::assessment_schema());
        let assessment: Assessment =
            generate_structured(self.generator.as_ref(), request).await?;

        Ok(format_assessment(&assessment))
    }
}

fn format_assessment(assessment: &Assessment) -> String {
    let mut out = format!(
        "📊 Score: {}/10\n\n{}",
        assessment.score.clamp(0.0, 10.0).round(),
        assessment.feedback.trim()
    );
    let follow_up = assessment.follow_up_question.trim();
    if assessment.follow_up_needed && !follow_up.is_empty() {
        out.push_str("\n\n❓ ");
        out.push_str(follow_up);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_assessment_with_follow_up() {
        let text = format_assessment(&Assessment {
            score: 7.4,
            feedback: "Good points.".to_string(),
            follow_up_needed: true,
            follow_up_question: "Why?".to_string(),
        });
        assert_eq!(text, "📊 Score: 7/10\n\nGood points.\n\n❓ Why?");
    }

    #[test]
    fn test_follow_up_omitted_when_not_needed() {
        let text = format_assessment(&Assessment {
            score: 3.0,
            feedback: "Too short.".to_string(),
            follow_up_needed: false,
            follow_up_question: "Ignored".to_string(),
        });
        assert!(!text.contains("Ignored"));
    }
}
