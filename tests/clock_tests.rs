//! Tests for the simulated clock

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use theme_park_sim::*;

#[test]
fn test_advance_wakes_sleeper() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let sleeper = {
        let clock = Arc::clone(&clock);
        thread::spawn(move || {
            clock.sleep_minutes(3);
            clock.now()
        })
    };

    // Give the sleeper time to block
    thread::sleep(Duration::from_millis(20));
    clock.advance(1);
    clock.advance(2);
    assert!(sleeper.join().unwrap() >= 3);
}

#[test]
fn test_stop_releases_sleepers() {
    let clock = Arc::new(SimClock::unbounded(0.01));
    let sleepers: Vec<_> = (0..4)
        .map(|_| {
            let clock = Arc::clone(&clock);
            thread::spawn(move || clock.sleep_minutes(1_000))
        })
        .collect();

    clock.stop();
    for sleeper in sleepers {
        sleeper.join().unwrap();
    }
    assert!(clock.should_stop());
}

#[test]
fn test_stop_is_latched() {
    let clock = SimClock::unbounded(1.0);
    clock.stop();
    clock.stop();
    clock.advance(5);
    assert!(clock.should_stop());
}

#[test]
fn test_closing_time_stops_clock() {
    let clock = SimClock::new(1.0, 10);
    clock.advance(9);
    assert!(!clock.should_stop());
    clock.advance(1);
    assert!(clock.should_stop());
}

/// At 2000 simulated minutes per second, 20 minutes pass in about 10 ms
#[test]
fn test_run_until_close_paces_time() {
    let clock = SimClock::new(2_000.0, 20);
    let started = Instant::now();
    clock.run_until_close();

    assert_eq!(clock.now(), 20);
    assert!(clock.should_stop());
    assert!(started.elapsed() >= Duration::from_millis(9));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_zero_opening_hours_start_stopped() {
    let clock = SimClock::new(1.0, 0);
    assert!(clock.should_stop());
    clock.run_until_close();
    assert_eq!(clock.now(), 0);
}
