use std::path::PathBuf;

use thiserror::Error;

use crate::elevator::ElevatorId;
use crate::request::Direction;

/// Rejections at the controller boundary. Nothing is mutated when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("floor {floor} is outside the building (0..={top_floor})")]
    InvalidFloor { floor: i64, top_floor: u32 },

    #[error("no elevator with id {0}")]
    UnknownElevator(ElevatorId),

    #[error("no elevator can take the {direction} call at floor {floor}")]
    SchedulerExhausted { floor: u32, direction: Direction },

    #[error("worker for elevator {0} is already running")]
    AlreadyStarted(ElevatorId),

    #[error("failed to start worker for elevator {0}: {1}")]
    WorkerSpawn(ElevatorId, String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Invalid building config: {0}")]
    Invalid(String),
}

/// Failures while bringing a fleet up.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
