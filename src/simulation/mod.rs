//! Simulation control
//!
//! This module contains the simulated clock, the run orchestrator, the
//! maintenance daemon, statistics collection and error handling.
//!
//! # Overview
//!
//! - **SimClock**: shared minute counter paced against wall time
//! - **ParkSimulation**: builds the park, spawns every actor and joins them at close
//! - **MaintenanceDaemon**: breaks rides at random and schedules their repair
//! - **ParkStatistics**: aggregates events into the end-of-day report
//! - **ParkError**: error handling for park operations
//!
//! # Usage Example
//!
//! ```rust
//! use theme_park_sim::simulation::*;
//! use theme_park_sim::types::ParkConfig;
//!
//! let mut config = ParkConfig::default();
//! config.seed = Some(7);
//!
//! let simulation = ParkSimulation::new(config).unwrap();
//! assert_eq!(simulation.seed(), 7);
//!
//! let clock = SimClock::unbounded(100.0);
//! clock.advance(15);
//! assert_eq!(clock.now(), 15);
//! ```

pub mod clock;
pub mod error;
pub mod logging;
pub mod maintenance;
pub mod orchestrator;
pub mod sampling;
pub mod statistics;

// Re-export all public types for convenience
pub use clock::*;
pub use error::*;
pub use logging::*;
pub use maintenance::*;
pub use orchestrator::*;
pub use statistics::*;
