//! Elevator dispatch core.
//!
//! A fixed fleet of cars, each driven by its own worker thread, serving hall
//! and cab calls in LOOK order. Hall calls are assigned by a pluggable
//! [`scheduler::DispatchPolicy`]; cab calls stay with their car.

pub mod config;
pub mod controller;
pub mod elevator;
pub mod error;
pub mod events;
pub mod fleet;
pub mod logging;
pub mod request;
pub mod scheduler;
pub mod state;

pub use config::BuildingConfig;
pub use controller::ElevatorController;
pub use elevator::{ElevatorId, ElevatorStatus, EnqueueOutcome};
pub use error::{ConfigError, DispatchError, FleetError};
pub use events::ElevatorEvent;
pub use fleet::FleetHandle;
pub use logging::init_logging;
pub use request::{Direction, Request, RequestKind};
pub use scheduler::{DirectionAware, DispatchPolicy, NearestIdle, PolicyKind};
pub use state::ElevatorState;
