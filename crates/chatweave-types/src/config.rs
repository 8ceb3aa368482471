use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thread classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// A candidate thread must reach this probability to be chosen
    pub min_probability: f64,
    /// Theme and summary are regenerated when the member count hits a multiple of this
    pub summary_interval: usize,
    /// How many recent members feed a regenerated summary
    pub summary_window: usize,
    pub fallback_theme: String,
    pub fallback_summary_chars: usize,
    pub max_theme_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_probability: 0.5,
            summary_interval: 5,
            summary_window: 10,
            fallback_theme: "New conversation".to_string(),
            fallback_summary_chars: 100,
            max_theme_chars: 200,
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_probability(mut self, probability: f64) -> Self {
        self.min_probability = probability;
        self
    }

    pub fn with_summary_interval(mut self, interval: usize) -> Self {
        self.summary_interval = interval.max(1);
        self
    }

    pub fn with_summary_window(mut self, window: usize) -> Self {
        self.summary_window = window;
        self
    }

    pub fn with_fallback_theme(mut self, theme: impl Into<String>) -> Self {
        self.fallback_theme = theme.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitratorConfig {
    /// Added to a strategy's score when the backend suggested it and it agrees
    pub suggestion_bonus: f64,
    pub max_confidence: f64,
    /// Run `should_respond` for all strategies concurrently
    pub parallel_evaluation: bool,
}

impl Default for ArbitratorConfig {
    fn default() -> Self {
        Self {
            suggestion_bonus: 0.30,
            max_confidence: 1.0,
            parallel_evaluation: false,
        }
    }
}

impl ArbitratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suggestion_bonus(mut self, bonus: f64) -> Self {
        self.suggestion_bonus = bonus;
        self
    }

    pub fn with_parallel_evaluation(mut self, enabled: bool) -> Self {
        self.parallel_evaluation = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Thread messages handed to the arbitrator
    pub context_window: usize,
    pub processing_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_window: 10,
            processing_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.processing_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.min_probability, 0.5);
        assert_eq!(config.summary_interval, 5);
        assert_eq!(config.summary_window, 10);
        assert_eq!(config.fallback_summary_chars, 100);
    }

    #[test]
    fn test_summary_interval_never_zero() {
        let config = ClassifierConfig::new().with_summary_interval(0);
        assert_eq!(config.summary_interval, 1);
    }

    #[test]
    fn test_arbitrator_builder() {
        let config = ArbitratorConfig::new()
            .with_suggestion_bonus(0.1)
            .with_parallel_evaluation(true);
        assert_eq!(config.suggestion_bonus, 0.1);
        assert!(config.parallel_evaluation);
        assert_eq!(config.max_confidence, 1.0);
    }

    #[test]
    fn test_pipeline_builder() {
        let config = PipelineConfig::new()
            .with_context_window(4)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.context_window, 4);
        assert_eq!(config.processing_timeout, Duration::from_secs(5));
    }
}
