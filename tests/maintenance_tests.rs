//! Tests for the maintenance daemon

use std::sync::Arc;
use std::thread;
use theme_park_sim::types::{MaintenanceConfig, RideConfig};
use theme_park_sim::*;

fn rides(clock: &Arc<SimClock>, names: &[&str]) -> Vec<Arc<Ride>> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let config = RideConfig::new(*name, 4, 3, 1);
            Arc::new(Ride::new(RideId(i as u64 + 1), &config, Arc::clone(clock), None).unwrap())
        })
        .collect()
}

/// A one-minute mean uptime breaks the ride almost immediately
#[test]
fn test_short_uptime_breaks_ride_then_repairs() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let rides = rides(&clock, &["Coaster"]);
    let config = MaintenanceConfig { mean_uptime: 1.0, mean_repair: 5.0 };
    let mut daemon = MaintenanceDaemon::new(&rides, &config, Arc::clone(&clock), 3).unwrap();

    let mut minutes = 0;
    while daemon.tick() == 0 {
        clock.advance(1);
        minutes += 1;
        assert!(minutes < 50, "ride never broke");
    }

    let ride = &rides[0];
    assert!(ride.is_broken());
    let repaired_at = ride.repaired_at().unwrap();
    assert!(repaired_at > clock.now());

    while clock.now() + 1 < repaired_at {
        clock.advance(1);
        assert!(ride.is_broken());
    }
    clock.advance(1);
    assert!(!ride.is_broken());
    assert_eq!(daemon.breakdowns(), 1);
}

#[test]
fn test_broken_rides_do_not_age() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let rides = rides(&clock, &["Coaster"]);
    let config = MaintenanceConfig { mean_uptime: 100_000.0, mean_repair: 5.0 };
    let mut daemon = MaintenanceDaemon::new(&rides, &config, Arc::clone(&clock), 1).unwrap();

    rides[0].break_for(10).unwrap();
    let before = daemon.uptime_left("Coaster").unwrap();
    for _ in 0..5 {
        daemon.tick();
    }
    assert_eq!(daemon.uptime_left("Coaster"), Some(before));
}

/// Dropped rides are skipped instead of failing the daemon
#[test]
fn test_dropped_ride_is_skipped() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let mut rides = rides(&clock, &["Coaster", "Swings"]);
    let config = MaintenanceConfig { mean_uptime: 1.0, mean_repair: 2.0 };
    let mut daemon = MaintenanceDaemon::new(&rides, &config, Arc::clone(&clock), 9).unwrap();

    rides.remove(0);
    for _ in 0..20 {
        daemon.tick();
        clock.advance(1);
    }
    assert!(daemon.breakdowns() >= 1);
}

#[test]
fn test_same_seed_same_schedule() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let rides = rides(&clock, &["A", "B", "C"]);
    let config = MaintenanceConfig { mean_uptime: 60.0, mean_repair: 10.0 };

    let first = MaintenanceDaemon::new(&rides, &config, Arc::clone(&clock), 77).unwrap();
    let second = MaintenanceDaemon::new(&rides, &config, Arc::clone(&clock), 77).unwrap();
    for name in ["A", "B", "C"] {
        assert_eq!(first.uptime_left(name), second.uptime_left(name));
    }
}

#[test]
fn test_invalid_means_rejected() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let rides = rides(&clock, &["A"]);
    let config = MaintenanceConfig { mean_uptime: 0.0, mean_repair: 10.0 };
    assert!(MaintenanceDaemon::new(&rides, &config, clock, 0).is_err());
}

#[test]
fn test_daemon_thread_stops_with_clock() {
    let clock = Arc::new(SimClock::unbounded(1.0));
    let rides = rides(&clock, &["A"]);
    let config = MaintenanceConfig { mean_uptime: 1.0, mean_repair: 1.0 };
    let daemon = MaintenanceDaemon::new(&rides, &config, Arc::clone(&clock), 5).unwrap();

    let handle = thread::spawn(move || daemon.run());
    clock.stop();
    handle.join().unwrap();
}
