use std::sync::Arc;

use anyhow::{anyhow, Result};
use chatweave_llm::TextGenerator;
use chatweave_persist::PersistClient;
use chatweave_types::{ArbitratorConfig, ClassifierConfig, PipelineConfig};

use crate::arbitrator::ResponseArbitrator;
use crate::classifier::ThreadClassifier;
use crate::orchestrator::Orchestrator;
use crate::queue::QueueService;
use crate::strategies::{QuestionStrategy, StrategyRegistry};
use crate::users::UserService;

/// Builder for wiring an [`Orchestrator`] from a backend and a set of stores
pub struct OrchestratorBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    persist: Option<PersistClient>,
    strategies: Option<StrategyRegistry>,
    classifier_config: ClassifierConfig,
    arbitrator_config: ArbitratorConfig,
    pipeline_config: PipelineConfig,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            generator: None,
            persist: None,
            strategies: None,
            classifier_config: ClassifierConfig::default(),
            arbitrator_config: ArbitratorConfig::default(),
            pipeline_config: PipelineConfig::default(),
        }
    }

    /// Set the text-generation backend
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn persist(mut self, persist: PersistClient) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Replace the standard strategy set
    pub fn strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.classifier_config = config;
        self
    }

    pub fn arbitrator_config(mut self, config: ArbitratorConfig) -> Self {
        self.arbitrator_config = config;
        self
    }

    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline_config = config;
        self
    }

    /// Build the Orchestrator. Stores default to in-memory ones.
    pub fn build(self) -> Result<Orchestrator> {
        let generator = self
            .generator
            .ok_or_else(|| anyhow!("Text generator is required"))?;
        let persist = self.persist.unwrap_or_else(PersistClient::in_memory);

        let users = UserService::new(persist.users());
        let queue = QueueService::new(persist.chats());
        let strategies = self.strategies.unwrap_or_else(|| {
            StrategyRegistry::standard(Arc::clone(&generator), users.clone(), queue.clone())
        });

        let classifier = ThreadClassifier::new(
            Arc::clone(&generator),
            persist.threads(),
            persist.messages(),
            self.classifier_config,
        );
        let arbitrator =
            ResponseArbitrator::new(Arc::clone(&generator), strategies, self.arbitrator_config);
        let questions = QuestionStrategy::new(generator, users.clone(), queue.clone());

        Ok(Orchestrator::new(
            persist.messages(),
            classifier,
            arbitrator,
            users,
            queue,
            questions,
            self.pipeline_config,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
