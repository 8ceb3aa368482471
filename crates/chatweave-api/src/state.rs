use std::sync::Arc;

use chatweave_engine::{Delivery, Orchestrator};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The orchestrator only holds a weak reference to the delivery client, so the
/// state owns it for the lifetime of the server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
    pub delivery: Arc<dyn Delivery>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Orchestrator, delivery: Arc<dyn Delivery>) -> Self {
        orchestrator.attach_delivery(&delivery);
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            delivery,
        }
    }
}
