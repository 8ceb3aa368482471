use std::fmt::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatweave_llm::{parse_json, GenerateRequest, TextGenerator};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{find_keyword, Evaluation, ResponseStrategy, StrategyContext};
use crate::prompts::{self, purpose};

const KEYWORDS: &[&str] = &[
    "agree",
    "decided",
    "let's do",
    "consensus",
    "deal",
    "согласны",
    "решили",
    "договорились",
];
const KEYWORD_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Deserialize)]
struct Agreements {
    #[serde(default)]
    agreements: Vec<Agreement>,
}

#[derive(Debug, Deserialize)]
struct Agreement {
    topic: String,
    decision: String,
    #[serde(default)]
    participants: Vec<String>,
}

/// Records decisions the group reached
pub struct AgreementStrategy {
    generator: Arc<dyn TextGenerator>,
}

impl AgreementStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ResponseStrategy for AgreementStrategy {
    fn name(&self) -> &str {
        "agreement"
    }

    fn priority(&self) -> u8 {
        75
    }

    async fn should_respond(&self, ctx: &StrategyContext<'_>) -> Result<Evaluation> {
        Ok(match find_keyword(&ctx.message.text, KEYWORDS) {
            Some(keyword) => {
                debug!(keyword, "Agreement keyword detected");
                Evaluation::respond(KEYWORD_CONFIDENCE)
            }
            None => Evaluation::pass(),
        })
    }

    async fn generate_response(&self, ctx: &StrategyContext<'_>) -> Result<String> {
        let request = GenerateRequest::new(
            purpose::AGREEMENTS,
            prompts::agreements_prompt(ctx.history(), ctx.message),
        )
        .with_schema(prompts::agreements_schema());

        let raw = self
            .generator
            .generate_content(request)
            .await
            .context("agreement extraction failed")?;

        match parse_json::<Agreements>(&raw) {
            Ok(parsed) => Ok(format_agreements(&parsed.agreements)),
            Err(e) => {
                warn!("Unstructured agreement reply: {}", e);
                Ok(format!("📝 Agreement noted:\n{}", raw.trim()))
            }
        }
    }
}

/// Empty when nothing was agreed
fn format_agreements(agreements: &[Agreement]) -> String {
    if agreements.is_empty() {
        return String::new();
    }
    let entries: Vec<String> = agreements
        .iter()
        .map(|a| {
            let mut entry = format!("✓ *{}*\n   Decision: {}", a.topic, a.decision);
            if !a.participants.is_empty() {
                let _ = write!(entry, "\n   Participants: {}", a.participants.join(", "));
            }
            entry
        })
        .collect();
    format!("📝 Agreement(s) recorded:\n\n{}", entries.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_agreements() {
        let text = format_agreements(&[
            Agreement {
                topic: "Venue".to_string(),
                decision: "Meet at the park".to_string(),
                participants: vec!["Ann".to_string(), "Bob".to_string()],
            },
            Agreement {
                topic: "Time".to_string(),
                decision: "10am".to_string(),
                participants: vec![],
            },
        ]);
        assert!(text.starts_with("📝 Agreement(s) recorded:"));
        assert!(text.contains("Participants: Ann, Bob"));
        assert!(text.ends_with("Decision: 10am"));
    }

    #[test]
    fn test_no_agreements_is_silent() {
        assert!(format_agreements(&[]).is_empty());
    }
}
