//! Simulated clock
//!
//! Every actor paces itself through a shared [`SimClock`]: time only moves when
//! the clock is advanced, either by the wall-time pacing loop in
//! [`SimClock::run_until_close`] or directly through [`SimClock::advance`].
//! Sleepers block on a condition variable until their target minute is reached
//! or the clock is stopped.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Smallest speed factor the clock accepts
pub const MIN_SPEED_FACTOR: f64 = 0.001;

/// Shared simulated clock
#[derive(Debug)]
pub struct SimClock {
    /// Simulated minutes per real second
    speed_factor: f64,
    /// Minute at which the park closes, if any
    open_minutes: Option<u64>,
    /// Current simulated minute
    now: Mutex<u64>,
    /// Signalled on every advance and on stop
    ticked: Condvar,
    /// Latched stop flag
    stopped: AtomicBool,
}

impl SimClock {
    /// Create a clock that closes after `open_minutes` simulated minutes
    #[instrument]
    pub fn new(speed_factor: f64, open_minutes: u64) -> Self {
        info!("Initializing simulated clock ({} sim-min/s, open {} min)", speed_factor, open_minutes);
        Self::build(speed_factor, Some(open_minutes))
    }

    /// Create a clock without closing time; it only stops through [`SimClock::stop`]
    pub fn unbounded(speed_factor: f64) -> Self {
        Self::build(speed_factor, None)
    }

    fn build(speed_factor: f64, open_minutes: Option<u64>) -> Self {
        let speed_factor = if speed_factor.is_finite() && speed_factor >= MIN_SPEED_FACTOR {
            speed_factor
        } else {
            warn!("Speed factor {} out of range, clamping to {}", speed_factor, MIN_SPEED_FACTOR);
            MIN_SPEED_FACTOR
        };

        Self {
            speed_factor,
            open_minutes,
            now: Mutex::new(0),
            ticked: Condvar::new(),
            stopped: AtomicBool::new(open_minutes == Some(0)),
        }
    }

    /// Current simulated minute
    pub fn now(&self) -> u64 {
        *self.now.lock()
    }

    /// Simulated minutes per real second
    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// Closing minute, if the clock has one
    pub fn open_minutes(&self) -> Option<u64> {
        self.open_minutes
    }

    /// Real time one simulated minute takes
    pub fn minute_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.speed_factor)
    }

    /// Whether the run has been stopped or has reached closing time
    pub fn should_stop(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stop the clock and wake every sleeper; idempotent
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("Clock stopped at minute {}", self.now());
        }
        // Take the lock so a sleeper between its flag check and its wait cannot miss this
        let _guard = self.now.lock();
        self.ticked.notify_all();
    }

    /// Move simulated time forward by `minutes` and wake sleepers whose target passed
    pub fn advance(&self, minutes: u64) -> u64 {
        let mut now = self.now.lock();
        *now += minutes;
        if let Some(close) = self.open_minutes {
            if *now >= close && !self.stopped.swap(true, Ordering::SeqCst) {
                info!("Closing time reached at minute {}", *now);
            }
        }
        self.ticked.notify_all();
        *now
    }

    /// Suspend the calling actor for `minutes` simulated minutes
    ///
    /// Returns early once the clock is stopped. Other actors are not blocked.
    pub fn sleep_minutes(&self, minutes: u64) {
        let mut now = self.now.lock();
        let target = *now + minutes;
        while *now < target && !self.should_stop() {
            self.ticked.wait(&mut now);
        }
    }

    /// Pace the clock against wall time until closing time or [`SimClock::stop`]
    pub fn run_until_close(&self) {
        let step = self.minute_duration();
        debug!("Pacing clock at {:?} per simulated minute", step);

        let mut now = self.now.lock();
        while !self.should_stop() {
            let deadline = Instant::now() + step;
            while !self.should_stop() && Instant::now() < deadline {
                self.ticked.wait_until(&mut now, deadline);
            }
            if self.should_stop() {
                break;
            }

            *now += 1;
            if let Some(close) = self.open_minutes {
                if *now >= close {
                    self.stopped.store(true, Ordering::SeqCst);
                    info!("Closing time reached at minute {}", *now);
                }
            }
            self.ticked.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_clock_creation() {
        let clock = SimClock::new(10.0, 600);
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.speed_factor(), 10.0);
        assert_eq!(clock.open_minutes(), Some(600));
        assert!(!clock.should_stop());
    }

    #[test]
    fn test_invalid_speed_is_clamped() {
        assert_eq!(SimClock::new(0.0, 10).speed_factor(), MIN_SPEED_FACTOR);
        assert_eq!(SimClock::new(-3.0, 10).speed_factor(), MIN_SPEED_FACTOR);
        assert_eq!(SimClock::unbounded(f64::NAN).speed_factor(), MIN_SPEED_FACTOR);
    }

    #[test]
    fn test_minute_duration_scales_with_speed() {
        let clock = SimClock::new(4.0, 10);
        assert_eq!(clock.minute_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_advance_latches_stop_at_close() {
        let clock = SimClock::new(1.0, 5);
        clock.advance(4);
        assert!(!clock.should_stop());
        clock.advance(1);
        assert!(clock.should_stop());
        assert_eq!(clock.now(), 5);
    }

    #[test]
    fn test_sleep_wakes_when_target_reached() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let sleeper = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || {
                clock.sleep_minutes(3);
                clock.now()
            })
        };

        // Advance one minute at a time until the sleeper returns
        while !sleeper.is_finished() {
            clock.advance(1);
            thread::sleep(Duration::from_millis(1));
        }
        assert!(sleeper.join().unwrap() >= 3);
    }

    #[test]
    fn test_stop_wakes_all_sleepers() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let sleepers: Vec<_> = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || clock.sleep_minutes(1_000_000))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        clock.stop();
        clock.stop();
        for sleeper in sleepers {
            sleeper.join().unwrap();
        }
        assert!(clock.should_stop());
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_run_until_close_paces_to_closing() {
        let clock = SimClock::new(1000.0, 20);
        clock.run_until_close();
        assert_eq!(clock.now(), 20);
        assert!(clock.should_stop());
    }

    #[test]
    fn test_run_until_close_interrupted_by_stop() {
        let clock = Arc::new(SimClock::new(0.5, 1_000));
        let runner = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || clock.run_until_close())
        };
        thread::sleep(Duration::from_millis(20));
        clock.stop();
        runner.join().unwrap();
        assert!(clock.now() < 1_000);
    }
}
