/**
Hall call dispatch

Each policy scores every elevator for an incoming hall call; the lowest score
wins. `None` means the elevator is not eligible at all.
*/
use std::fmt;

use serde::Deserialize;

use crate::elevator::{ElevatorId, ElevatorStatus};
use crate::error::DispatchError;
use crate::request::{Direction, Request};
use crate::state::ElevatorState;

pub trait DispatchPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score `car` for `call`; smaller is better.
    fn cost(&self, car: &ElevatorStatus, call: &Request) -> Option<u32>;

    /// Pick the cheapest eligible elevator from a fleet snapshot. Ties go to
    /// the one earliest in fleet order.
    fn select(&self, fleet: &[ElevatorStatus], call: &Request) -> Result<ElevatorId, DispatchError> {
        fleet
            .iter()
            .filter_map(|car| self.cost(car, call).map(|cost| (cost, car.id)))
            .min_by_key(|(cost, _)| *cost)
            .map(|(_, id)| id)
            .ok_or(DispatchError::SchedulerExhausted {
                floor: call.floor(),
                direction: call.direction(),
            })
    }
}

/// Closest idle elevator; busy ones are never chosen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestIdle;

impl DispatchPolicy for NearestIdle {
    fn name(&self) -> &'static str {
        "nearest-idle"
    }

    fn cost(&self, car: &ElevatorStatus, call: &Request) -> Option<u32> {
        car.state
            .is_idle()
            .then(|| car.floor.abs_diff(call.floor()))
    }
}

/// Idle elevators and ones that will pass the call on their way.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionAware;

impl DispatchPolicy for DirectionAware {
    fn name(&self) -> &'static str {
        "direction-aware"
    }

    fn cost(&self, car: &ElevatorStatus, call: &Request) -> Option<u32> {
        let distance = car.floor.abs_diff(call.floor());
        match (car.state, call.direction()) {
            (ElevatorState::Idle, _) => Some(distance),
            (ElevatorState::MovingUp, Direction::Up) if car.floor <= call.floor() => Some(distance),
            (ElevatorState::MovingDown, Direction::Down) if car.floor >= call.floor() => {
                Some(distance)
            }
            _ => None,
        }
    }
}

/// Policy selector used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    NearestIdle,
    #[default]
    DirectionAware,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn DispatchPolicy> {
        match self {
            PolicyKind::NearestIdle => Box::new(NearestIdle),
            PolicyKind::DirectionAware => Box::new(DirectionAware),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::NearestIdle => write!(f, "nearest-idle"),
            PolicyKind::DirectionAware => write!(f, "direction-aware"),
        }
    }
}
