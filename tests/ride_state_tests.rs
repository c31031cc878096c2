//! Tests for the ride lifecycle: boarding, running, breakdown and repair

use std::sync::{mpsc, Arc};
use theme_park_sim::*;

fn ride(capacity: usize, run: u64, window: u64) -> (Arc<SimClock>, Arc<MemorySink>, Ride) {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let sink = Arc::new(MemorySink::new());
    let config = types::RideConfig::new("Log Flume", capacity, run, window);
    let ride = Ride::new(RideId(1), &config, Arc::clone(&clock), Some(sink.clone() as Arc<dyn MetricsSink>)).unwrap();
    (clock, sink, ride)
}

fn enqueue(ride: &Ride, ids: std::ops::Range<u64>, at: u64) {
    for id in ids {
        ride.queue().enqueue(Ticket::new(VisitorId(id), at, 60)).unwrap();
    }
}

/// Fastpass and arrival order decide who boards a two-seat ride
#[test]
fn test_two_seat_ride_boards_by_priority() {
    let (clock, _, ride) = ride(2, 5, 1);
    ride.queue().enqueue(Ticket::new(VisitorId(1), 0, 60)).unwrap();
    clock.advance(1);
    ride.queue().enqueue(Ticket::new(VisitorId(2), 1, 60)).unwrap();
    clock.advance(1);
    ride.queue().enqueue(Ticket::new(VisitorId(3), 2, 60).with_tier(1)).unwrap();
    clock.advance(1);

    let boarded: Vec<VisitorId> = ride.queue().dequeue_up_to(ride.capacity()).iter().map(|t| t.holder).collect();
    assert_eq!(boarded, vec![VisitorId(3), VisitorId(1)]);
}

#[test]
fn test_full_ride_launches_and_completes() {
    let (clock, sink, ride) = ride(3, 4, 10);
    let (tx, rx) = mpsc::channel();
    for id in 0..3 {
        ride.queue().enqueue(Ticket::new(VisitorId(id), 0, 60).with_reply(tx.clone())).unwrap();
    }

    ride.tick();
    assert_eq!(ride.status(), RideStatus::Running);
    assert_eq!(ride.riders_on_board(), 3);
    assert!(ride.queue().is_empty());

    clock.advance(3);
    ride.tick();
    assert_eq!(ride.status(), RideStatus::Running);

    clock.advance(1);
    ride.tick();
    assert_eq!(ride.status(), RideStatus::Idle);
    assert_eq!(sink.count("ride_cycle"), 1);
    assert_eq!(sink.count("ticket_served"), 3);
    assert_eq!(rx.try_iter().count(), 3);
}

#[test]
fn test_partial_load_waits_for_window() {
    let (clock, _, ride) = ride(4, 2, 3);
    enqueue(&ride, 0..1, 0);

    ride.tick();
    assert_eq!(ride.status(), RideStatus::Boarding);

    clock.advance(1);
    enqueue(&ride, 1..2, 1);
    ride.tick();
    assert_eq!(ride.status(), RideStatus::Boarding);
    assert_eq!(ride.riders_on_board(), 2);

    clock.advance(2);
    ride.tick();
    assert_eq!(ride.status(), RideStatus::Running);
    assert_eq!(ride.riders_on_board(), 2);
}

/// Tickets pulled during boarding survive a breakdown
#[test]
fn test_break_mid_boarding_requeues_riders() {
    let (clock, _, ride) = ride(5, 3, 4);
    enqueue(&ride, 0..3, 0);
    let before = ride.queue().len();

    assert_eq!(ride.board().unwrap(), 3);
    assert_eq!(ride.status(), RideStatus::Boarding);
    assert!(ride.queue().is_empty());

    let repaired_at = ride.break_for(6).unwrap();
    assert_eq!(repaired_at, clock.now() + 6);
    assert_eq!(ride.queue().len(), before);
    assert_eq!(ride.queue().holders(), vec![VisitorId(0), VisitorId(1), VisitorId(2)]);
    assert_eq!(ride.riders_on_board(), 0);
}

#[test]
fn test_broken_ride_refuses_boarding() {
    let (_, _, ride) = ride(2, 3, 1);
    enqueue(&ride, 0..2, 0);
    ride.break_for(5).unwrap();

    assert!(matches!(ride.board(), Err(RideError::RepairInProgress { .. })));
    ride.tick();
    assert_eq!(ride.queue().len(), 2);
    assert!(ride.is_broken());
}

#[test]
fn test_second_break_is_rejected() {
    let (_, sink, ride) = ride(2, 3, 1);
    let repaired_at = ride.break_for(5).unwrap();

    let err = ride.break_for(2).unwrap_err();
    assert_eq!(err, RideError::AlreadyBroken { ride: "Log Flume".to_string(), repaired_at });
    assert_eq!(sink.count("ride_broke"), 1);
}

#[test]
fn test_repair_completes_lazily() {
    let (clock, sink, ride) = ride(2, 3, 1);
    ride.break_for(4).unwrap();

    clock.advance(3);
    assert!(ride.is_broken());
    assert_eq!(ride.repaired_at(), Some(4));

    clock.advance(1);
    assert!(!ride.is_broken());
    assert_eq!(ride.repaired_at(), None);

    // The repair event is emitted once the ride itself observes it
    assert_eq!(sink.count("ride_repaired"), 0);
    ride.tick();
    assert_eq!(sink.count("ride_repaired"), 1);
}

#[test]
fn test_zero_capacity_rejected() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let config = types::RideConfig::new("Nothing", 0, 3, 1);
    let err = Ride::new(RideId(2), &config, clock, None).unwrap_err();
    assert_eq!(err.category(), "Construction");
}

/// A direct dequeue on a ride's queue is capped at the ride's seats
#[test]
fn test_dequeue_capped_at_ride_capacity() {
    let (_, _, ride) = ride(2, 5, 1);
    enqueue(&ride, 0..5, 0);

    let taken = ride.queue().dequeue_up_to(5);
    assert!(taken.len() <= ride.capacity());
    assert_eq!(taken.iter().map(|t| t.holder).collect::<Vec<_>>(), vec![VisitorId(0), VisitorId(1)]);
    assert_eq!(ride.queue().len(), 3);
}
