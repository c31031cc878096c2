//! Theme Park Simulator
//!
//! A concurrent discrete-event simulation of an amusement park. Rides, food
//! stands, the maintenance crew, the arrival process and every visitor run on
//! their own OS thread, sharing a simulated clock that advances one minute at a
//! time at a configurable pace.
//!
//! # Overview
//!
//! Visitors arrive along a configurable daily curve, pick rides by preference or
//! expected wait, queue with optional fastpass priority, give up when their
//! patience runs out and grab food when hungry. Rides board in batches, run for
//! a fixed cycle and break down at random until repaired. Every state change is
//! reported to a metrics sink which writes an event log and folds the events
//! into end-of-day statistics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use theme_park_sim::*;
//!
//! let mut config = ParkConfig::default();
//! config.time.speed_factor = 600.0;
//! config.seed = Some(42);
//!
//! let report = ParkSimulation::new(config)?.run()?;
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums and configuration
//! - [`events`]: park events, metrics sinks and the event log recorder
//! - [`facility`]: wait queues, rides, food stands and the park registry
//! - [`visitor`]: visitor profiles, ride choice, the visitor actor and arrivals
//! - [`simulation`]: clock, orchestration, maintenance, statistics and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Facility   │    │   Visitor   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ WaitQueue   │◄───┤ Profiles    │
//! │ Enums       │    │ Ride        │    │ RideChoice  │
//! │ Config      │    │ FoodStand   │    │ Arrivals    │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   │                   │
//!        │                   ▼                   ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Simulation  │    │   Events    │    │ Statistics  │
//! │             │    │             │    │             │
//! │ SimClock    ├───►│ ParkEvent   ├───►│ per ride    │
//! │ Maintenance │    │ Recorder    │    │ park wide   │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod events;
pub mod facility;
pub mod simulation;
pub mod types;
pub mod visitor;

// Core types and identifiers
pub use types::{
    ConfigError,
    ConfigValidationError,
    // Identifiers
    IdGenerator,
    OutputFormat,
    // Configuration
    ParkConfig,
    RideId,
    // Enums
    RideStatus,
    RunId,
    StaffId,
    VisitorId,
    VisitorKind,
};

// Facilities
pub use facility::{FoodStand, Park, Ride, Ticket, TicketOutcome, WaitQueue};

// Events and metrics
pub use events::{MemorySink, MetricsRecorder, MetricsSink, ParkEvent};

// Visitors
pub use visitor::{ArrivalGenerator, RideChoice, Visitor, VisitorProfile, VisitorSummary};

// Simulation control
pub use simulation::{
    MaintenanceDaemon, ParkError, ParkResult, ParkSimulation, ParkStatistics, QueueError, RideError, SimClock,
    SimulationReport,
};
