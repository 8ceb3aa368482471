mod common;

use std::sync::Arc;

use chatweave_engine::prompts::purpose;
use chatweave_engine::{ResponseArbitrator, StrategyContext, StrategyRegistry};
use chatweave_llm::ScriptedGenerator;
use chatweave_types::ArbitratorConfig;
use serde_json::json;

use common::{message, thread, FixedStrategy};

fn judgment(should_respond: bool, suggested: &str) -> serde_json::Value {
    json!({
        "should_respond": should_respond,
        "confidence": 0.8,
        "reason": "test",
        "suggested_strategy": suggested,
    })
}

fn arbitrator(
    generator: ScriptedGenerator,
    strategies: &[Arc<FixedStrategy>],
    config: ArbitratorConfig,
) -> ResponseArbitrator {
    let mut registry = StrategyRegistry::new();
    for strategy in strategies {
        registry.register(strategy.clone());
    }
    ResponseArbitrator::new(Arc::new(generator), registry, config)
}

#[tokio::test]
async fn test_suggestion_bonus_flips_winner() {
    let y = Arc::new(FixedStrategy::new("y", 100, true, 0.9));
    let x = Arc::new(FixedStrategy::new("x", 80, true, 0.8));
    let generator =
        ScriptedGenerator::new().respond_json(purpose::RESPONSE_ANALYSIS, judgment(true, "x"));
    let arbitrator = arbitrator(generator, &[y.clone(), x.clone()], ArbitratorConfig::default());

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    let reply = arbitrator.analyze_and_respond(&ctx).await.unwrap().unwrap();
    assert_eq!(reply.strategy, "x");
    assert_eq!(reply.text, "reply from x");
    assert!((reply.confidence - 0.94).abs() < 1e-9);
}

#[tokio::test]
async fn test_suggestion_bonus_does_not_flip_winner() {
    let y = Arc::new(FixedStrategy::new("y", 100, true, 0.9));
    let x = Arc::new(FixedStrategy::new("x", 80, true, 0.5));
    let generator =
        ScriptedGenerator::new().respond_json(purpose::RESPONSE_ANALYSIS, judgment(true, "x"));
    let arbitrator = arbitrator(generator, &[y.clone(), x.clone()], ArbitratorConfig::default());

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    let winner = arbitrator.select_strategy(&ctx, Some("x")).await.unwrap();
    assert_eq!(winner.name(), "y");
    assert!((winner.adjusted_confidence - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn test_coarse_no_means_no_evaluations() {
    let y = Arc::new(FixedStrategy::new("y", 100, true, 0.9));
    let x = Arc::new(FixedStrategy::new("x", 80, true, 0.8));
    let generator =
        ScriptedGenerator::new().respond_json(purpose::RESPONSE_ANALYSIS, judgment(false, "x"));
    let arbitrator = arbitrator(generator, &[y.clone(), x.clone()], ArbitratorConfig::default());

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    assert!(arbitrator.analyze_and_respond(&ctx).await.unwrap().is_none());
    assert_eq!(x.evaluations(), 0);
    assert_eq!(y.evaluations(), 0);
}

#[tokio::test]
async fn test_coarse_failure_stays_silent() {
    let x = Arc::new(FixedStrategy::new("x", 80, true, 0.8));
    let generator = ScriptedGenerator::new().fail(purpose::RESPONSE_ANALYSIS, "backend down");
    let arbitrator = arbitrator(generator, &[x.clone()], ArbitratorConfig::default());

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    assert!(arbitrator.analyze_and_respond(&ctx).await.unwrap().is_none());
    assert_eq!(x.evaluations(), 0);
}

#[tokio::test]
async fn test_nobody_willing_means_no_reply() {
    let x = Arc::new(FixedStrategy::new("x", 80, false, 0.0));
    let generator =
        ScriptedGenerator::new().respond_json(purpose::RESPONSE_ANALYSIS, judgment(true, ""));
    let arbitrator = arbitrator(generator, &[x.clone()], ArbitratorConfig::default());

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    assert!(arbitrator.analyze_and_respond(&ctx).await.unwrap().is_none());
    assert_eq!(x.evaluations(), 1);
}

#[tokio::test]
async fn test_ties_go_to_first_evaluated() {
    let a = Arc::new(FixedStrategy::new("a", 100, true, 0.5));
    let b = Arc::new(FixedStrategy::new("b", 100, true, 0.5));
    let arbitrator = arbitrator(
        ScriptedGenerator::new(),
        &[a.clone(), b.clone()],
        ArbitratorConfig::default(),
    );

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    let winner = arbitrator.select_strategy(&ctx, None).await.unwrap();
    assert_eq!(winner.name(), "a");
}

#[tokio::test]
async fn test_failing_strategy_is_skipped() {
    let broken = Arc::new(FixedStrategy::failing("broken", 100));
    let general = Arc::new(FixedStrategy::new("general", 30, true, 0.3));
    let arbitrator = arbitrator(
        ScriptedGenerator::new(),
        &[broken.clone(), general.clone()],
        ArbitratorConfig::default(),
    );

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    let winner = arbitrator.select_strategy(&ctx, Some("broken")).await.unwrap();
    assert_eq!(winner.name(), "general");
    assert_eq!(broken.evaluations(), 1);
}

#[tokio::test]
async fn test_parallel_evaluation_matches_sequential() {
    let y = Arc::new(FixedStrategy::new("y", 100, true, 0.9));
    let x = Arc::new(FixedStrategy::new("x", 80, true, 0.8));
    let z = Arc::new(FixedStrategy::new("z", 70, false, 0.0));
    let generator =
        ScriptedGenerator::new().respond_json(purpose::RESPONSE_ANALYSIS, judgment(true, "x"));
    let arbitrator = arbitrator(
        generator,
        &[y.clone(), x.clone(), z.clone()],
        ArbitratorConfig::default().with_parallel_evaluation(true),
    );

    let thread = thread();
    let msg = message(2, 7, "hello");
    let messages = vec![msg.clone()];
    let ctx = StrategyContext::new(&thread, &messages, &msg);

    let reply = arbitrator.analyze_and_respond(&ctx).await.unwrap().unwrap();
    assert_eq!(reply.strategy, "x");
    assert_eq!((x.evaluations(), y.evaluations(), z.evaluations()), (1, 1, 1));
}

#[test]
fn test_bonus_is_capped() {
    let arbitrator = ResponseArbitrator::new(
        Arc::new(ScriptedGenerator::new()),
        StrategyRegistry::new(),
        ArbitratorConfig::default(),
    );
    let evaluation = chatweave_engine::Evaluation::respond(0.95);
    assert_eq!(arbitrator.adjusted_confidence(&evaluation, 100, true), 1.0);
    assert!((arbitrator.adjusted_confidence(&evaluation, 50, false) - 0.475).abs() < 1e-9);
}
