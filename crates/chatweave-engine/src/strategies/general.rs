use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatweave_llm::{GenerateRequest, TextGenerator};

use super::{Evaluation, ResponseStrategy, StrategyContext};
use crate::prompts::{self, purpose};

const CONFIDENCE: f64 = 0.3;

/// Backstop that is always eligible with a low confidence
pub struct GeneralStrategy {
    generator: Arc<dyn TextGenerator>,
}

impl GeneralStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ResponseStrategy for GeneralStrategy {
    fn name(&self) -> &str {
        "general"
    }

    fn priority(&self) -> u8 {
        30
    }

    async fn should_respond(&self, _ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        Ok(Evaluation::respond(CONFIDENCE))
    }

    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String> {
        let prompt = prompts::general_response_prompt(ctx.thread, ctx.history(), ctx.message);
        let request = GenerateRequest::new(purpose::GENERAL_RESPONSE, prompt)
            .with_system_instruction("You are a friendly member of a group chat.");
        let text = self
            .generator
            .generate_content(request)
            .await
            .context("general response generation failed")?;
        Ok(text.trim().to_string())
    }
}
