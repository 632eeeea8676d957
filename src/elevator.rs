/*
Elevator unit

User case:
1. accept stops from the controller (hall calls) or its own cab (cab calls)
2. run its own worker: pick the next stop, move one floor at a time
3. open the door on arrival, then close it and carry on
4. park the worker when there is nothing left to do
*/
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, sleep, JoinHandle};
use std::time::Duration;

use crossbeam_utils::sync::{Parker, Unparker};
use futures::channel::oneshot;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::events::{ElevatorEvent, EventBus};
use crate::request::{Direction, Request};
use crate::state::ElevatorState;

/// 1-based position of the elevator in its fleet.
pub type ElevatorId = usize;

/// A queued floor together with the queue it sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub floor: u32,
    pub direction: Direction,
}

/// Point-in-time view of one elevator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub id: ElevatorId,
    pub floor: u32,
    pub state: ElevatorState,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// The floor was already queued, in either direction.
    AlreadyQueued,
    /// The car is idle on that floor already.
    AtFloor,
}

/// Motion timing for a worker.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub floor_travel: Duration,
    pub door_dwell: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            floor_travel: Duration::from_millis(500),
            door_dwell: Duration::from_millis(2000),
        }
    }
}

/// What one call to [`Car::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Idle {
        floor: u32,
    },
    Moved {
        from: u32,
        floor: u32,
        target: Stop,
        retargeted: bool,
    },
    Arrived {
        stop: Stop,
        state: ElevatorState,
    },
}

/// Everything guarded by the per-elevator lock.
#[derive(Debug, Default)]
pub(crate) struct Car {
    floor: u32,
    state: ElevatorState,
    // ascending; served low to high while moving up
    up: BTreeSet<u32>,
    // served high to low while moving down
    down: BTreeSet<u32>,
    target: Option<Stop>,
    waiters: Vec<(u32, oneshot::Sender<()>)>,
}

impl Car {
    fn queue_mut(&mut self, direction: Direction) -> &mut BTreeSet<u32> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    fn is_drained(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    fn pending(&self) -> usize {
        self.up.len() + self.down.len()
    }

    pub(crate) fn enqueue(&mut self, floor: u32, direction: Direction) -> EnqueueOutcome {
        if self.state.is_idle() && floor == self.floor {
            return EnqueueOutcome::AtFloor;
        }
        if self.up.contains(&floor) || self.down.contains(&floor) {
            return EnqueueOutcome::AlreadyQueued;
        }
        self.queue_mut(direction).insert(floor);
        if self.state.is_idle() {
            if let Some(stop) = self.plan() {
                self.state = self.state.toward(self.floor, stop.floor);
            }
        }
        EnqueueOutcome::Queued
    }

    /// Next stop under LOOK: keep going while the current direction has
    /// work ahead, otherwise turn to the other queue.
    pub(crate) fn plan(&self) -> Option<Stop> {
        let up = |floor: &u32| Stop {
            floor: *floor,
            direction: Direction::Up,
        };
        let down = |floor: &u32| Stop {
            floor: *floor,
            direction: Direction::Down,
        };
        let lowest_up = self.up.first().map(up);
        let highest_down = self.down.last().map(down);

        match self.state {
            ElevatorState::MovingUp => self
                .up
                .range(self.floor..)
                .next()
                .map(up)
                .or(highest_down)
                .or(lowest_up),
            ElevatorState::MovingDown => self
                .down
                .range(..=self.floor)
                .next_back()
                .map(down)
                .or(lowest_up)
                .or(highest_down),
            ElevatorState::Idle => match (lowest_up, highest_down) {
                (Some(u), Some(d)) => {
                    if u.floor.abs_diff(self.floor) < d.floor.abs_diff(self.floor) {
                        Some(u)
                    } else {
                        Some(d)
                    }
                }
                (u, d) => u.or(d),
            },
        }
    }

    /// Advance by at most one floor.
    pub(crate) fn step(&mut self) -> Step {
        let Some(stop) = self.plan() else {
            self.state = self.state.stop();
            self.target = None;
            return Step::Idle { floor: self.floor };
        };

        if stop.floor == self.floor {
            self.queue_mut(stop.direction).remove(&stop.floor);
            self.state = self.state.arrive(stop.direction, self.is_drained());
            self.target = None;
            self.notify_arrival(stop.floor);
            return Step::Arrived {
                stop,
                state: self.state,
            };
        }

        let from = self.floor;
        self.state = self.state.toward(from, stop.floor);
        self.floor = if stop.floor > from { from + 1 } else { from - 1 };
        let retargeted = self.target != Some(stop);
        self.target = Some(stop);
        Step::Moved {
            from,
            floor: self.floor,
            target: stop,
            retargeted,
        }
    }

    fn notify_arrival(&mut self, floor: u32) {
        let (ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiters)
            .into_iter()
            .partition(|(f, _)| *f == floor);
        self.waiters = pending
            .into_iter()
            .filter(|(_, tx)| !tx.is_canceled())
            .collect();
        for (_, tx) in ready {
            let _ = tx.send(());
        }
    }
}

pub struct Elevator {
    id: ElevatorId,
    car: Mutex<Car>,
    // taken by the worker when it starts
    parker: Mutex<Option<Parker>>,
    unparker: Unparker,
    shutdown: AtomicBool,
    events: Arc<EventBus>,
    timing: Timing,
}

impl Elevator {
    pub fn new(id: ElevatorId, events: Arc<EventBus>, timing: Timing) -> Self {
        let parker = Parker::new();
        let unparker = parker.unparker().clone();
        Self {
            id,
            car: Mutex::new(Car::default()),
            parker: Mutex::new(Some(parker)),
            unparker,
            shutdown: AtomicBool::new(false),
            events,
            timing,
        }
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn status(&self) -> ElevatorStatus {
        let car = self.car.lock();
        ElevatorStatus {
            id: self.id,
            floor: car.floor,
            state: car.state,
            pending: car.pending(),
        }
    }

    /// Queue `floor` in the `direction` queue and wake the worker. Never waits
    /// on the worker.
    pub fn enqueue(&self, floor: u32, direction: Direction) -> EnqueueOutcome {
        let outcome = self.car.lock().enqueue(floor, direction);
        self.after_enqueue(floor, direction, outcome);
        outcome
    }

    /// Queue a destination pressed inside this car. The queue is chosen from
    /// the car's floor under the same lock; `None` means the car is there.
    pub fn enqueue_cab(&self, floor: u32) -> Option<(Request, EnqueueOutcome)> {
        let (request, outcome) = {
            let mut car = self.car.lock();
            let request = Request::cab(floor, car.floor)?;
            let outcome = car.enqueue(request.floor(), request.direction());
            (request, outcome)
        };
        self.after_enqueue(request.floor(), request.direction(), outcome);
        Some((request, outcome))
    }

    fn after_enqueue(&self, floor: u32, direction: Direction, outcome: EnqueueOutcome) {
        match outcome {
            EnqueueOutcome::Queued => {
                debug!("elevator {} queued floor {} {}", self.id, floor, direction);
                self.unparker.unpark();
            }
            EnqueueOutcome::AlreadyQueued => {
                debug!("elevator {} already has floor {}", self.id, floor);
            }
            EnqueueOutcome::AtFloor => {
                debug!("elevator {} is idle at floor {}", self.id, floor);
            }
        }
    }

    /// Force the state machine back to Idle. The worker re-plans from Idle
    /// on its next step if anything is still queued.
    pub fn stop(&self) {
        let mut car = self.car.lock();
        car.state = car.state.stop();
        car.target = None;
    }

    /// Resolves `true` on the next arrival at `floor`, straight away if the
    /// car is idle there, or `false` once the worker has shut down.
    pub fn arrival(&self, floor: u32) -> impl Future<Output = bool> {
        let (tx, rx) = oneshot::channel();
        {
            let mut car = self.car.lock();
            if car.state.is_idle() && car.floor == floor {
                let _ = tx.send(());
            } else if !self.shutdown.load(Ordering::Acquire) {
                car.waiters.push((floor, tx));
            }
        }
        rx.map(|res| res.is_ok())
    }

    /// Start the worker thread. Only the first call succeeds.
    pub(crate) fn spawn(self: &Arc<Self>) -> Result<JoinHandle<()>, DispatchError> {
        let parker = self
            .parker
            .lock()
            .take()
            .ok_or(DispatchError::AlreadyStarted(self.id))?;
        let elevator = Arc::clone(self);
        thread::Builder::new()
            .name(format!("elevator-{}", self.id))
            .spawn(move || elevator.run(parker))
            .map_err(|e| DispatchError::WorkerSpawn(self.id, e.to_string()))
    }

    /// Ask the worker to exit at its next step.
    pub(crate) fn halt(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.unparker.unpark();
    }

    fn run(&self, parker: Parker) {
        info!("elevator {} worker started", self.id);
        let mut idle_announced = false;

        while !self.shutdown.load(Ordering::Acquire) {
            let step = self.car.lock().step();
            match step {
                Step::Idle { floor } => {
                    if !idle_announced {
                        debug!("elevator {} idle at floor {}", self.id, floor);
                        self.events.publish(ElevatorEvent::Idle {
                            elevator: self.id,
                            floor,
                        });
                        idle_announced = true;
                    }
                    // an unpark that raced ahead of us leaves the token set
                    parker.park();
                }
                Step::Moved {
                    from,
                    floor,
                    target,
                    retargeted,
                } => {
                    idle_announced = false;
                    if retargeted {
                        let state = ElevatorState::Idle.toward(from, target.floor);
                        info!(
                            "elevator {} heading from {} to {} ({})",
                            self.id, from, target.floor, state
                        );
                        self.events.publish(ElevatorEvent::Departed {
                            elevator: self.id,
                            from,
                            target: target.floor,
                            state,
                        });
                    }
                    self.travel(floor);
                }
                Step::Arrived { stop, state } => {
                    idle_announced = false;
                    self.open_door(stop, state);
                    self.close_door();
                }
            }
        }

        // wake anyone still waiting on an arrival
        self.car.lock().waiters.clear();
        info!("elevator {} worker stopped", self.id);
    }

    fn travel(&self, floor: u32) {
        debug!("elevator {} at floor {}", self.id, floor);
        self.events.publish(ElevatorEvent::Moved {
            elevator: self.id,
            floor,
        });
        sleep(self.timing.floor_travel);
    }

    fn open_door(&self, stop: Stop, state: ElevatorState) {
        info!(
            "elevator {} arrived at floor {} ({}), door opening, now {}",
            self.id, stop.floor, stop.direction, state
        );
        self.events.publish(ElevatorEvent::Arrived {
            elevator: self.id,
            floor: stop.floor,
            direction: stop.direction,
        });
        sleep(self.timing.door_dwell);
    }

    fn close_door(&self) {
        debug!("elevator {} door closed", self.id);
    }
}
