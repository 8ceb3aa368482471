use std::time::Duration;

use chatweave_persist::PersistError;
use chatweave_types::QueueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Delivery failed: {0}")]
    Delivery(#[source] anyhow::Error),

    #[error("No delivery client attached")]
    DeliveryDetached,

    #[error("Processing exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Persist(e) => e.is_not_found(),
            Self::Queue(e) => e.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
