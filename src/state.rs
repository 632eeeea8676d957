//! Per-car motion state machine.
//!
//! The state is a plain tag owned by the car; transitions are functions of
//! the current tag and the floors involved, so nothing here points back at
//! the elevator that owns it.

use std::fmt;

use crate::request::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevatorState {
    #[default]
    Idle,
    MovingUp,
    MovingDown,
}

impl ElevatorState {
    /// State for serving a queue in `direction`.
    pub fn serving(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::MovingUp,
            Direction::Down => Self::MovingDown,
        }
    }

    /// Transition taken when the car leaves `from` heading for `to`.
    ///
    /// A target on the current floor keeps the current tag: the car stops
    /// without moving.
    pub fn toward(self, from: u32, to: u32) -> Self {
        if to > from {
            Self::MovingUp
        } else if to < from {
            Self::MovingDown
        } else {
            self
        }
    }

    /// Transition taken after arriving to serve a stop queued in `direction`.
    /// `drained` is true when both queues are empty afterwards.
    pub fn arrive(self, direction: Direction, drained: bool) -> Self {
        if drained {
            self.stop()
        } else {
            Self::serving(direction)
        }
    }

    /// Forces Idle from either moving state.
    pub fn stop(self) -> Self {
        Self::Idle
    }

    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::MovingUp => write!(f, "MovingUp"),
            Self::MovingDown => write!(f, "MovingDown"),
        }
    }
}
