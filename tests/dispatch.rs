use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use futures::executor::block_on;

use elevator_dispatch::{
    BuildingConfig, Direction, ElevatorEvent, ElevatorId, ElevatorState, FleetHandle, PolicyKind,
};

const TOP_FLOOR: u32 = 10;
const TIMEOUT: Duration = Duration::from_secs(10);

fn fleet(elevators: usize, policy: PolicyKind) -> FleetHandle {
    fleet_with_travel(elevators, policy, 20)
}

fn fleet_with_travel(elevators: usize, policy: PolicyKind, floor_travel_ms: u64) -> FleetHandle {
    FleetHandle::from_config(&BuildingConfig {
        elevators,
        top_floor: TOP_FLOOR,
        policy,
        floor_travel_ms,
        door_dwell_ms: 0,
        log_level: None,
    })
    .unwrap()
}

/// Collect `expected` arrivals, in the order they happen.
fn arrivals(rx: &Receiver<ElevatorEvent>, expected: usize) -> Vec<(ElevatorId, u32)> {
    let deadline = Instant::now() + TIMEOUT;
    let mut served = Vec::new();
    while served.len() < expected {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(ElevatorEvent::Arrived { elevator, floor, .. }) => served.push((elevator, floor)),
            Ok(_) => {}
            Err(_) => panic!("timed out with arrivals {served:?}"),
        }
    }
    served
}

/// Wait for the fleet to settle and check nothing else was served.
fn assert_settled(fleet: &FleetHandle, rx: &Receiver<ElevatorEvent>) {
    let deadline = Instant::now() + TIMEOUT;
    while !fleet.is_idle() {
        assert!(Instant::now() < deadline, "fleet never went idle");
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(50));
    let extra: Vec<_> = rx
        .try_iter()
        .filter(|e| matches!(e, ElevatorEvent::Arrived { .. }))
        .collect();
    assert!(extra.is_empty(), "unexpected arrivals {extra:?}");
}

fn wait_for_floor(rx: &Receiver<ElevatorEvent>, elevator: ElevatorId, floor: u32) {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(ElevatorEvent::Moved { elevator: e, floor: f }) if e == elevator && f == floor => {
                return
            }
            Ok(_) => {}
            Err(_) => panic!("elevator {elevator} never reached floor {floor}"),
        }
    }
}

/// Send every car up to floor 9 and wait until all of them are on the way.
fn all_cars_heading_up(fleet: &FleetHandle) {
    for status in fleet.statuses() {
        assert!(fleet.request_cab(status.id, 9));
    }
    let deadline = Instant::now() + TIMEOUT;
    while !fleet
        .statuses()
        .iter()
        .all(|s| s.state == ElevatorState::MovingUp && s.floor >= 2)
    {
        assert!(Instant::now() < deadline, "cars never left the ground floor");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_concurrent_hall_calls_on_single_car() {
    // slow enough that floor 3 is still ahead once both calls are queued
    let fleet = fleet_with_travel(1, PolicyKind::DirectionAware, 250);
    let rx = fleet.subscribe();
    let barrier = Arc::new(Barrier::new(2));

    let callers: Vec<_> = [3, 7]
        .into_iter()
        .map(|floor| {
            let fleet = fleet.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                fleet.request_hall(floor, Direction::Up)
            })
        })
        .collect();
    for caller in callers {
        assert!(caller.join().unwrap());
    }

    assert_eq!(arrivals(&rx, 2), vec![(1, 3), (1, 7)]);
    assert_settled(&fleet, &rx);
}

#[test]
fn test_out_of_range_floors_are_rejected() {
    let fleet = fleet(2, PolicyKind::DirectionAware);
    let rx = fleet.subscribe();

    assert!(!fleet.request_hall(-1, Direction::Up));
    assert!(!fleet.request_hall(TOP_FLOOR as i64 + 1, Direction::Down));
    assert!(!fleet.request_cab(1, -3));
    assert!(!fleet.request_cab(1, TOP_FLOOR as i64 + 1));
    assert!(!fleet.request_cab(3, 2));

    thread::sleep(Duration::from_millis(50));
    for status in fleet.statuses() {
        assert_eq!(status.floor, 0);
        assert_eq!(status.state, ElevatorState::Idle);
        assert_eq!(status.pending, 0);
    }
    assert!(rx
        .try_iter()
        .all(|e| matches!(e, ElevatorEvent::Idle { .. })));
    assert!(fleet.get_status(3).is_none());
}

#[test]
fn test_repeated_calls_for_one_floor_are_served_once() {
    let fleet = fleet(1, PolicyKind::DirectionAware);
    let rx = fleet.subscribe();

    assert!(fleet.request_hall(5, Direction::Up));
    assert!(fleet.request_hall(5, Direction::Up));
    assert!(fleet.request_cab(1, 5));

    assert_eq!(arrivals(&rx, 1), vec![(1, 5)]);
    assert_settled(&fleet, &rx);
}

#[test]
fn test_cab_call_below_goes_to_down_queue() {
    let fleet = fleet(1, PolicyKind::DirectionAware);

    let at_five = fleet.arrival(1, 5).unwrap();
    assert!(fleet.request_cab(1, 5));
    assert!(block_on(at_five));
    assert_eq!(fleet.get_status(1).unwrap().state, ElevatorState::Idle);

    let at_two = fleet.arrival(1, 2).unwrap();
    assert!(fleet.request_cab(1, 2));
    let status = fleet.get_status(1).unwrap();
    assert_eq!(status.state, ElevatorState::MovingDown);
    assert_eq!(status.pending, 1);
    assert!(block_on(at_two));
    assert_eq!(fleet.get_status(1).unwrap().floor, 2);
}

#[test]
fn test_down_call_behind_waits_for_up_trip() {
    let fleet = fleet(1, PolicyKind::DirectionAware);
    let rx = fleet.subscribe();

    assert!(fleet.request_cab(1, 8));
    wait_for_floor(&rx, 1, 6);
    assert!(fleet.request_hall(2, Direction::Down));

    assert_eq!(arrivals(&rx, 2), vec![(1, 8), (1, 2)]);
    assert_settled(&fleet, &rx);
}

#[test]
fn test_nearest_idle_picks_closer_car() {
    let fleet = fleet(2, PolicyKind::NearestIdle);

    let at_ten = fleet.arrival(2, 10).unwrap();
    assert!(fleet.request_cab(2, 10));
    assert!(block_on(at_ten));

    assert_eq!(fleet.controller().handle_hall_call(8, Direction::Up), Ok(2));
}

#[test]
fn test_busy_car_is_passed_over() {
    let fleet = fleet(2, PolicyKind::NearestIdle);

    // both idle at 0: the tie goes to the first car, which leaves at once
    assert_eq!(fleet.controller().handle_hall_call(5, Direction::Up), Ok(1));
    assert_eq!(fleet.controller().handle_hall_call(3, Direction::Down), Ok(2));
}

#[test]
fn test_no_eligible_car_falls_back_to_first() {
    let fleet = fleet_with_travel(2, PolicyKind::DirectionAware, 50);
    all_cars_heading_up(&fleet);

    // both cars are above floor 1 and moving up, so neither will pass it
    let before = fleet.get_status(1).unwrap().pending;
    let at_one = fleet.arrival(1, 1).unwrap();
    assert_eq!(fleet.controller().handle_hall_call(1, Direction::Up), Ok(1));
    assert_eq!(fleet.get_status(1).unwrap().pending, before + 1);
    assert_eq!(fleet.get_status(2).unwrap().pending, 1);

    assert!(block_on(at_one));
}

#[test]
fn test_nearest_idle_with_all_cars_busy_falls_back_to_first() {
    let fleet = fleet_with_travel(3, PolicyKind::NearestIdle, 50);
    all_cars_heading_up(&fleet);

    let before = fleet.get_status(1).unwrap().pending;
    let at_five = fleet.arrival(1, 5).unwrap();
    assert_eq!(fleet.controller().handle_hall_call(5, Direction::Down), Ok(1));
    assert_eq!(fleet.get_status(1).unwrap().pending, before + 1);

    assert!(block_on(at_five));
}

#[test]
fn test_arrival_is_cancelled_by_shutdown() {
    let fleet = fleet(1, PolicyKind::DirectionAware);
    let never = fleet.arrival(1, 9).unwrap();
    fleet.shutdown();
    assert!(!block_on(never));
}

#[test]
fn test_create_fleet_with_defaults() {
    let fleet = FleetHandle::create_fleet(3).unwrap();
    assert_eq!(fleet.statuses().len(), 3);
    assert_eq!(fleet.controller().top_floor(), 15);
    assert!(fleet.is_idle());
    assert!(FleetHandle::create_fleet(0).is_err());
}
