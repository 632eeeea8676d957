//! Caller-facing fleet handle.
//!
//! The handle is created once by the entry point and cloned into every
//! request path. Boundary calls answer with a plain accepted/rejected flag;
//! the typed reason is logged. Workers stop when the last clone is dropped
//! or on [`FleetHandle::shutdown`].

use std::future::Future;
use std::sync::Arc;

use crossbeam::channel::Receiver;
use tracing::warn;

use crate::config::BuildingConfig;
use crate::controller::ElevatorController;
use crate::elevator::{ElevatorId, ElevatorStatus};
use crate::error::FleetError;
use crate::events::ElevatorEvent;
use crate::request::Direction;

#[derive(Clone)]
pub struct FleetHandle {
    controller: Arc<ElevatorController>,
}

impl FleetHandle {
    /// Start `size` cars with the default building settings.
    pub fn create_fleet(size: usize) -> Result<Self, FleetError> {
        Self::from_config(&BuildingConfig::with_elevators(size))
    }

    pub fn from_config(config: &BuildingConfig) -> Result<Self, FleetError> {
        Ok(Self {
            controller: Arc::new(ElevatorController::start(config)?),
        })
    }

    pub fn controller(&self) -> &ElevatorController {
        &self.controller
    }

    pub fn request_hall(&self, floor: i64, direction: Direction) -> bool {
        match self.controller.handle_hall_call(floor, direction) {
            Ok(_) => true,
            Err(err) => {
                warn!("hall call rejected: {}", err);
                false
            }
        }
    }

    pub fn request_cab(&self, elevator: ElevatorId, floor: i64) -> bool {
        match self.controller.handle_cab_call(elevator, floor) {
            Ok(_) => true,
            Err(err) => {
                warn!("cab call rejected: {}", err);
                false
            }
        }
    }

    pub fn get_status(&self, elevator: ElevatorId) -> Option<ElevatorStatus> {
        self.controller.status(elevator).ok()
    }

    pub fn statuses(&self) -> Vec<ElevatorStatus> {
        self.controller.statuses()
    }

    pub fn subscribe(&self) -> Receiver<ElevatorEvent> {
        self.controller.subscribe()
    }

    /// See [`crate::elevator::Elevator::arrival`]. `None` for an unknown car.
    pub fn arrival(
        &self,
        elevator: ElevatorId,
        floor: u32,
    ) -> Option<impl Future<Output = bool>> {
        self.controller.arrival(elevator, floor).ok()
    }

    /// True when every car is idle with nothing queued.
    pub fn is_idle(&self) -> bool {
        self.statuses()
            .iter()
            .all(|s| s.state.is_idle() && s.pending == 0)
    }

    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}
