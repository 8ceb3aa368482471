use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatweave_llm::{generate_structured, parse_json, GenerateRequest, TextGenerator};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{find_keyword, Evaluation, ResponseStrategy, StrategyContext};
use crate::prompts::{self, purpose};

const KEYWORDS: &[&str] = &[
    "is it true",
    "fact",
    "actually",
    "really",
    "correct",
    "wrong",
    "источник",
    "правда ли",
    "на самом деле",
];
const KEYWORD_CONFIDENCE: f64 = 0.75;

#[derive(Debug, Deserialize)]
struct CheckNeeded {
    needs_checking: bool,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct Verdict {
    verified: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    additional_info: String,
}

/// Verifies factual claims
pub struct FactCheckingStrategy {
    generator: Arc<dyn TextGenerator>,
}

impl FactCheckingStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ResponseStrategy for FactCheckingStrategy {
    fn name(&self) -> &str {
        "fact_checking"
    }

    fn priority(&self) -> u8 {
        80
    }

    async fn should_respond(&self, ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        if let Some(keyword) = find_keyword(&ctx.message.text, KEYWORDS) {
            debug!(keyword, "Fact-checking keyword detected");
            return Ok(Evaluation::respond(KEYWORD_CONFIDENCE));
        }

        let request = GenerateRequest::new(
            purpose::FACT_CHECK_NEEDED,
            prompts::fact_check_needed_prompt(ctx.message),
        )
        .with_schema(prompts::fact_check_needed_schema());

        match generate_structured::<CheckNeeded>(self.generator.as_ref(), request).await {
            Ok(result) => Ok(Evaluation::new(result.needs_checking, result.confidence)),
            Err(e) => {
                warn!("Fact-check analysis failed: {}", e);
                Ok(Evaluation::pass())
            }
        }
    }

    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String> {
        let request = GenerateRequest::new(
            purpose::FACT_CHECK,
            prompts::fact_check_prompt(ctx.history(), ctx.message),
        )
        .with_schema(prompts::fact_check_schema());

        let raw = self
            .generator
            .generate_content(request)
            .await
            .context("fact check failed")?;

        let verdict: Verdict = match parse_json(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unstructured fact check reply: {}", e);
                return Ok(format!("🔍 Fact check:\n{}", raw.trim()));
            }
        };
        debug!(verified = verdict.verified, confidence = verdict.confidence, "Fact check verdict");
        Ok(format_verdict(&verdict))
    }
}

fn format_verdict(verdict: &Verdict) -> String {
    let mut out = String::from("🔍 Fact check:\n\n");
    if verdict.verified {
        out.push_str("✅ This is accurate.\n\n");
    } else {
        out.push_str("⚠️ This may not be true.\n\n");
    }
    out.push_str(verdict.explanation.trim());
    if !verdict.additional_info.trim().is_empty() {
        out.push_str("\n\n📚 Additional context: ");
        out.push_str(verdict.additional_info.trim());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_verdict() {
        let verdict = Verdict {
            verified: false,
            confidence: 0.9,
            explanation: "The Great Wall is not visible from orbit.".to_string(),
            additional_info: String::new(),
        };
        let text = format_verdict(&verdict);
        assert!(text.contains("⚠️"));
        assert!(text.ends_with("not visible from orbit."));
        assert!(!text.contains("Additional context"));
    }
}
