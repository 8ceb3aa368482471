//! Two-stage reply selection.
//!
//! One coarse backend judgment decides whether to reply at all. Only then does every
//! strategy score itself; scores are weighted by priority and the strategy the backend
//! suggested gets a bonus if it agrees. The single best strategy writes the reply.

use std::sync::Arc;

use anyhow::{Context, Result};
use chatweave_llm::{generate_structured, GenerateRequest, TextGenerator};
use chatweave_types::ArbitratorConfig;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::prompts::{self, purpose};
use crate::strategies::{Evaluation, ResponseStrategy, StrategyContext, StrategyRegistry};

#[derive(Debug, Clone, Deserialize)]
struct CoarseJudgment {
    should_respond: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    suggested_strategy: Option<String>,
}

/// The arbitration winner
#[derive(Clone)]
pub struct StrategyResult {
    pub strategy: Arc<dyn ResponseStrategy>,
    pub should_respond: bool,
    pub adjusted_confidence: f64,
}

impl StrategyResult {
    pub fn name(&self) -> &str {
        self.strategy.name()
    }
}

impl std::fmt::Debug for StrategyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyResult")
            .field("strategy", &self.strategy.name())
            .field("should_respond", &self.should_respond)
            .field("adjusted_confidence", &self.adjusted_confidence)
            .finish()
    }
}

/// Text produced by the winning strategy, unescaped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub strategy: String,
    pub text: String,
    pub confidence: f64,
}

pub struct ResponseArbitrator {
    generator: Arc<dyn TextGenerator>,
    strategies: StrategyRegistry,
    config: ArbitratorConfig,
}

impl ResponseArbitrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        strategies: StrategyRegistry,
        config: ArbitratorConfig,
    ) -> Self {
        Self {
            generator,
            strategies,
            config,
        }
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// `Ok(None)` when no reply is warranted. Errors only come from the winner's
    /// `generate_response`.
    pub async fn analyze_and_respond(&self, ctx: &StrategyContext<'_>) -> Result<Option<Reply>> {
        let Some(judgment) = self.coarse_judgment(ctx).await else {
            return Ok(None);
        };

        let suggested = judgment
            .suggested_strategy
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let Some(winner) = self.select_strategy(ctx, suggested).await else {
            debug!("No strategy wants to respond");
            return Ok(None);
        };

        info!(
            strategy = winner.name(),
            confidence = winner.adjusted_confidence,
            "Strategy selected"
        );
        let text = winner
            .strategy
            .generate_response(ctx)
            .await
            .with_context(|| format!("strategy {} failed to generate a response", winner.name()))?;

        Ok(Some(Reply {
            strategy: winner.name().to_string(),
            text,
            confidence: winner.adjusted_confidence,
        }))
    }

    /// Score every strategy and return the one with the strictly greatest adjusted
    /// confidence. The suggested strategy is evaluated first, so it wins ties.
    pub async fn select_strategy(
        &self,
        ctx: &StrategyContext<'_>,
        suggested: Option<&str>,
    ) -> Option<StrategyResult> {
        let ordered = self.evaluation_order(suggested);

        let evaluations: Vec<Result<Evaluation>> = if self.config.parallel_evaluation {
            join_all(ordered.iter().map(|s| s.should_respond(ctx))).await
        } else {
            let mut out = Vec::with_capacity(ordered.len());
            for strategy in &ordered {
                out.push(strategy.should_respond(ctx).await);
            }
            out
        };

        let mut best: Option<StrategyResult> = None;
        for (strategy, evaluation) in ordered.into_iter().zip(evaluations) {
            let evaluation = match evaluation {
                Ok(e) => e,
                Err(e) => {
                    warn!(strategy = strategy.name(), "Strategy evaluation failed: {:#}", e);
                    continue;
                }
            };
            if !evaluation.should_respond {
                continue;
            }

            let is_suggested = suggested == Some(strategy.name());
            let adjusted = self.adjusted_confidence(&evaluation, strategy.priority(), is_suggested);
            debug!(
                strategy = strategy.name(),
                raw = evaluation.confidence,
                adjusted,
                suggested = is_suggested,
                "Strategy evaluated"
            );

            if best.as_ref().map_or(true, |b| adjusted > b.adjusted_confidence) {
                best = Some(StrategyResult {
                    strategy,
                    should_respond: true,
                    adjusted_confidence: adjusted,
                });
            }
        }
        best
    }

    /// `raw * priority / 100`, plus the suggestion bonus capped at the maximum
    pub fn adjusted_confidence(&self, evaluation: &Evaluation, priority: u8, suggested: bool) -> f64 {
        let weight = f64::from(priority.min(100)) / 100.0;
        let adjusted = evaluation.confidence * weight;
        if suggested {
            (adjusted + self.config.suggestion_bonus).min(self.config.max_confidence)
        } else {
            adjusted
        }
    }

    fn evaluation_order(&self, suggested: Option<&str>) -> Vec<Arc<dyn ResponseStrategy>> {
        let mut ordered = Vec::with_capacity(self.strategies.len());
        if let Some(first) = suggested.and_then(|name| self.strategies.get(name)) {
            ordered.push(first);
        }
        ordered.extend(
            self.strategies
                .iter()
                .filter(|s| Some(s.name()) != suggested)
                .cloned(),
        );
        ordered
    }

    /// `None` means stay silent, including when the backend failed
    async fn coarse_judgment(&self, ctx: &StrategyContext<'_>) -> Option<CoarseJudgment> {
        let names = self.strategies.names();
        let prompt =
            prompts::response_analysis_prompt(ctx.thread, ctx.history(), ctx.message, &names);
        let request = GenerateRequest::new(purpose::RESPONSE_ANALYSIS, prompt)
            .with_schema(prompts::response_analysis_schema(&names));

        match generate_structured::<CoarseJudgment>(self.generator.as_ref(), request).await {
            Ok(judgment) => {
                debug!(
                    should_respond = judgment.should_respond,
                    confidence = judgment.confidence,
                    reason = %judgment.reason,
                    suggested = ?judgment.suggested_strategy,
                    "Response analysis"
                );
                judgment.should_respond.then_some(judgment)
            }
            Err(e) => {
                warn!(thread_id = %ctx.thread.id, "Response analysis failed: {}", e);
                None
            }
        }
    }
}
