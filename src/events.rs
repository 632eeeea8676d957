//! Observable elevator events.
//!
//! Workers publish every movement and arrival here; callers subscribe to get
//! their own receiver. Receivers that have been dropped are pruned on the
//! next publish.

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::elevator::ElevatorId;
use crate::request::Direction;
use crate::state::ElevatorState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevatorEvent {
    /// Committed to a new next stop, leaving idle, reversing, or picking up
    /// a stop that was queued on the way.
    Departed {
        elevator: ElevatorId,
        from: u32,
        target: u32,
        state: ElevatorState,
    },
    /// Crossed one floor boundary.
    Moved { elevator: ElevatorId, floor: u32 },
    /// Stopped to serve a call queued in `direction`.
    Arrived {
        elevator: ElevatorId,
        floor: u32,
        direction: Direction,
    },
    /// Both queues drained; the worker is about to park.
    Idle { elevator: ElevatorId, floor: u32 },
}

impl ElevatorEvent {
    pub fn elevator(&self) -> ElevatorId {
        match self {
            Self::Departed { elevator, .. }
            | Self::Moved { elevator, .. }
            | Self::Arrived { elevator, .. }
            | Self::Idle { elevator, .. } => *elevator,
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<ElevatorEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ElevatorEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn publish(&self, event: ElevatorEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
