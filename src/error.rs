//! Crate error type
//!
//! Only loading and construction can fail. Gameplay callbacks never do.

use thiserror::Error;

use crate::sim::{AggregatorId, EntityId, SensorId};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown level '{0}'")]
    UnknownLevel(String),

    #[error("level select index {0} is out of range")]
    LevelIndexOutOfRange(usize),

    #[error("unknown sensor {0:?}")]
    UnknownSensor(SensorId),

    #[error("unknown aggregator {0:?}")]
    UnknownAggregator(AggregatorId),

    #[error("sensor {0:?} declared twice")]
    DuplicateSensor(SensorId),

    #[error("aggregator {0:?} declared twice")]
    DuplicateAggregator(AggregatorId),

    #[error("entity {0:?} declared twice")]
    DuplicateEntity(EntityId),
}

pub type Result<T> = std::result::Result<T, GameError>;
