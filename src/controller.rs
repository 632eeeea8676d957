/*
Request intake

User case:
1. accept hall calls and cab calls from any thread
2. reject floors outside the building and unknown cars before touching anything
3. pick a car for each hall call, hand cab calls straight to their car
4. start every worker once, and stop them all on shutdown
*/
use std::future::Future;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::BuildingConfig;
use crate::elevator::{Elevator, ElevatorId, ElevatorStatus};
use crate::error::{DispatchError, FleetError};
use crate::events::{ElevatorEvent, EventBus};
use crate::request::{Direction, Request};
use crate::scheduler::DispatchPolicy;

pub struct ElevatorController {
    elevators: Vec<Arc<Elevator>>,
    policy: Box<dyn DispatchPolicy>,
    top_floor: u32,
    events: Arc<EventBus>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ElevatorController {
    /// Build the fleet described by `config` and start one worker per car.
    pub fn start(config: &BuildingConfig) -> Result<Self, FleetError> {
        config.validate()?;

        let events = Arc::new(EventBus::new());
        let timing = config.timing();
        let elevators: Vec<Arc<Elevator>> = (1..=config.elevators)
            .map(|id| Arc::new(Elevator::new(id, Arc::clone(&events), timing)))
            .collect();

        let controller = Self {
            elevators,
            policy: config.policy.build(),
            top_floor: config.top_floor,
            events,
            workers: Mutex::new(Vec::with_capacity(config.elevators)),
        };
        for elevator in &controller.elevators {
            // on error, drop stops whatever already started
            let handle = elevator.spawn()?;
            controller.workers.lock().push(handle);
        }

        info!(
            "fleet of {} started, floors 0..={}, {} dispatch",
            controller.elevators.len(),
            controller.top_floor,
            controller.policy.name()
        );
        Ok(controller)
    }

    pub fn top_floor(&self) -> u32 {
        self.top_floor
    }

    fn check_floor(&self, floor: i64) -> Result<u32, DispatchError> {
        u32::try_from(floor)
            .ok()
            .filter(|f| *f <= self.top_floor)
            .ok_or(DispatchError::InvalidFloor {
                floor,
                top_floor: self.top_floor,
            })
    }

    fn elevator(&self, id: ElevatorId) -> Result<&Arc<Elevator>, DispatchError> {
        id.checked_sub(1)
            .and_then(|idx| self.elevators.get(idx))
            .ok_or(DispatchError::UnknownElevator(id))
    }

    /// Route a hall call through the dispatch policy and queue it on the
    /// chosen car. Returns the car's id.
    pub fn handle_hall_call(
        &self,
        floor: i64,
        direction: Direction,
    ) -> Result<ElevatorId, DispatchError> {
        let floor = self.check_floor(floor)?;
        let call = Request::hall(floor, direction);

        let fleet = self.statuses();
        let id = match self.policy.select(&fleet, &call) {
            Ok(id) => id,
            Err(err) => {
                let first = self.elevators[0].id();
                warn!("{}; falling back to elevator {}", err, first);
                first
            }
        };

        let outcome = self.elevator(id)?.enqueue(floor, direction);
        info!("{} -> elevator {} ({:?})", call, id, outcome);
        Ok(id)
    }

    /// Queue a destination pressed inside car `id`. Returns `None` when the
    /// car is already at `floor`.
    pub fn handle_cab_call(
        &self,
        id: ElevatorId,
        floor: i64,
    ) -> Result<Option<Request>, DispatchError> {
        let elevator = self.elevator(id)?;
        let floor = self.check_floor(floor)?;

        match elevator.enqueue_cab(floor) {
            Some((request, outcome)) => {
                info!("{} in elevator {} ({:?})", request, id, outcome);
                Ok(Some(request))
            }
            None => {
                info!("elevator {} is already at floor {}", id, floor);
                Ok(None)
            }
        }
    }

    pub fn status(&self, id: ElevatorId) -> Result<ElevatorStatus, DispatchError> {
        Ok(self.elevator(id)?.status())
    }

    /// Snapshot every car in fleet order. Each car is locked on its own, so
    /// the result is not one atomic view of the fleet.
    pub fn statuses(&self) -> Vec<ElevatorStatus> {
        self.elevators.iter().map(|e| e.status()).collect()
    }

    pub fn subscribe(&self) -> Receiver<ElevatorEvent> {
        self.events.subscribe()
    }

    pub fn arrival(
        &self,
        id: ElevatorId,
        floor: u32,
    ) -> Result<impl Future<Output = bool>, DispatchError> {
        Ok(self.elevator(id)?.arrival(floor))
    }

    /// Stop and join every worker. Safe to call more than once.
    pub fn shutdown(&self) {
        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        if handles.is_empty() {
            return;
        }
        for elevator in &self.elevators {
            elevator.halt();
        }
        for handle in handles {
            if handle.join().is_err() {
                warn!("elevator worker panicked");
            }
        }
        info!("fleet stopped");
    }
}

impl Drop for ElevatorController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
