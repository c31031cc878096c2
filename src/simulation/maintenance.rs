//! Maintenance daemon
//!
//! Breaks rides at random, independently of how busy they are. Each ride has
//! an uptime countdown drawn from an exponential distribution; when it runs
//! out the ride is broken for an exponentially drawn repair time and a fresh
//! uptime is drawn.

use rand::rngs::StdRng;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use super::clock::SimClock;
use super::error::{ParkError, ParkResult, RideError};
use super::sampling::{exponential_minutes, stream_rng};
use crate::facility::Ride;
use crate::types::MaintenanceConfig;

#[derive(Debug)]
struct TrackedRide {
    name: String,
    ride: Weak<Ride>,
    uptime_left: u64,
    gone: bool,
}

/// Background actor injecting breakdowns
#[derive(Debug)]
pub struct MaintenanceDaemon {
    rides: Vec<TrackedRide>,
    mean_uptime: f64,
    mean_repair: f64,
    clock: Arc<SimClock>,
    rng: StdRng,
    breakdowns: usize,
}

impl MaintenanceDaemon {
    /// Watch `rides`; the daemon holds only weak references to them
    pub fn new(
        rides: &[Arc<Ride>],
        config: &MaintenanceConfig,
        clock: Arc<SimClock>,
        seed: u64,
    ) -> ParkResult<Self> {
        for (field, value) in [("mean_uptime", config.mean_uptime), ("mean_repair", config.mean_repair)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParkError::invalid("maintenance daemon", format!("{} must be positive, got {}", field, value)));
            }
        }

        let mut rng = stream_rng(seed, 0);
        let rides = rides
            .iter()
            .map(|ride| TrackedRide {
                name: ride.name().to_string(),
                ride: Arc::downgrade(ride),
                uptime_left: exponential_minutes(&mut rng, config.mean_uptime),
                gone: false,
            })
            .collect();

        Ok(Self {
            rides,
            mean_uptime: config.mean_uptime,
            mean_repair: config.mean_repair,
            clock,
            rng,
            breakdowns: 0,
        })
    }

    /// Breakdowns caused so far
    pub fn breakdowns(&self) -> usize {
        self.breakdowns
    }

    /// Minutes of uptime left before `ride` breaks, if it is watched
    pub fn uptime_left(&self, ride: &str) -> Option<u64> {
        self.rides.iter().find(|t| t.name == ride).map(|t| t.uptime_left)
    }

    /// Age every working ride by one minute and break the ones whose uptime ran out
    ///
    /// Returns the number of rides broken during this minute.
    pub fn tick(&mut self) -> usize {
        let mut broken_now = 0;

        for tracked in self.rides.iter_mut() {
            if tracked.gone {
                continue;
            }
            match tracked.ride.upgrade().map(|ride| ride.is_broken()) {
                None => {
                    warn!("Maintenance skipping: {}", RideError::RideGone(tracked.name.clone()));
                    tracked.gone = true;
                    continue;
                }
                Some(true) => continue,
                Some(false) => {}
            }

            tracked.uptime_left = tracked.uptime_left.saturating_sub(1);
            if tracked.uptime_left > 0 {
                continue;
            }

            let repair = exponential_minutes(&mut self.rng, self.mean_repair);
            match Self::break_ride(tracked, repair) {
                Ok(repaired_at) => {
                    broken_now += 1;
                    debug!("Broke {} until minute {}", tracked.name, repaired_at);
                }
                Err(e @ RideError::AlreadyBroken { .. }) => {
                    warn!("Maintenance absorbed duplicate break: {}", e);
                }
                Err(e @ RideError::RideGone(_)) => {
                    warn!("Maintenance skipping: {}", e);
                    tracked.gone = true;
                }
                Err(e @ RideError::RepairInProgress { .. }) => {
                    warn!("Maintenance absorbed: {}", e);
                }
            }
            tracked.uptime_left = exponential_minutes(&mut self.rng, self.mean_uptime);
        }

        self.breakdowns += broken_now;
        broken_now
    }

    fn break_ride(tracked: &TrackedRide, repair: u64) -> Result<u64, RideError> {
        let ride = tracked.ride.upgrade().ok_or_else(|| RideError::RideGone(tracked.name.clone()))?;
        ride.break_for(repair)
    }

    /// Run once per simulated minute until the clock stops
    pub fn run(mut self) -> usize {
        info!(
            "Maintenance watching {} rides (mean uptime {} min, mean repair {} min)",
            self.rides.len(),
            self.mean_uptime,
            self.mean_repair
        );
        while !self.clock.should_stop() {
            self.tick();
            self.clock.sleep_minutes(1);
        }
        info!("Maintenance done after {} breakdowns", self.breakdowns);
        self.breakdowns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RideConfig;

    fn ride(name: &str, clock: &Arc<SimClock>) -> Arc<Ride> {
        Arc::new(Ride::new(crate::types::RideId(1), &RideConfig::new(name, 4, 3, 1), Arc::clone(clock), None).unwrap())
    }

    #[test]
    fn test_rejects_non_positive_means() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let config = MaintenanceConfig { mean_uptime: 0.0, mean_repair: 5.0 };
        assert!(MaintenanceDaemon::new(&[], &config, clock, 1).is_err());
    }

    #[test]
    fn test_uptime_counts_down_only_while_working() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let coaster = ride("Coaster", &clock);
        let config = MaintenanceConfig { mean_uptime: 100_000.0, mean_repair: 5.0 };
        let mut daemon = MaintenanceDaemon::new(&[Arc::clone(&coaster)], &config, Arc::clone(&clock), 9).unwrap();

        let start = daemon.uptime_left("Coaster").unwrap();
        daemon.tick();
        assert_eq!(daemon.uptime_left("Coaster"), Some(start - 1));

        coaster.break_for(10).unwrap();
        daemon.tick();
        assert_eq!(daemon.uptime_left("Coaster"), Some(start - 1));
    }

    #[test]
    fn test_dropped_ride_is_skipped() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let coaster = ride("Coaster", &clock);
        let config = MaintenanceConfig { mean_uptime: 1.0, mean_repair: 1.0 };
        let mut daemon = MaintenanceDaemon::new(&[Arc::clone(&coaster)], &config, clock, 3).unwrap();
        drop(coaster);

        for _ in 0..5 {
            assert_eq!(daemon.tick(), 0);
        }
        assert_eq!(daemon.breakdowns(), 0);
    }
}
