/*
Request values

User case:
1. a hall call: someone on a floor pressed the up or down button
2. a cab call: someone inside a car pressed a floor button
*/
use std::fmt;

/// Travel direction attached to a request, and the queue it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Pressed on a landing, not yet bound to a car.
    Hall,
    /// Pressed inside a car, bound to that car.
    Cab,
}

/// An immutable call for service at `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    floor: u32,
    direction: Direction,
    kind: RequestKind,
}

impl Request {
    pub fn hall(floor: u32, direction: Direction) -> Self {
        Self {
            floor,
            direction,
            kind: RequestKind::Hall,
        }
    }

    /// Cab calls only carry a destination; the queue is picked by where the
    /// car is right now. Returns `None` when the car is already there.
    pub fn cab(floor: u32, current_floor: u32) -> Option<Self> {
        let direction = if floor > current_floor {
            Direction::Up
        } else if floor < current_floor {
            Direction::Down
        } else {
            return None;
        };
        Some(Self {
            floor,
            direction,
            kind: RequestKind::Cab,
        })
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RequestKind::Hall => write!(f, "hall call {} {}", self.floor, self.direction),
            RequestKind::Cab => write!(f, "cab call {} ({})", self.floor, self.direction),
        }
    }
}
