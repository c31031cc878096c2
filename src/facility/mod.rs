//! Rides, food stands and their queues
//!
//! This module holds the shared resources actors contend for.
//!
//! # Overview
//!
//! - **WaitQueue**: thread-safe priority/patience queue of [`Ticket`]s
//! - **Ride**: lifecycle state machine fed by its own queue
//! - **FoodStand**: staff actor serving a FIFO order queue
//! - **Park**: registry of all facilities with wait estimates and fastpass policy
//!
//! # Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use theme_park_sim::facility::*;
//! use theme_park_sim::simulation::SimClock;
//! use theme_park_sim::types::*;
//!
//! let clock = Arc::new(SimClock::unbounded(1.0));
//! let ride = Ride::new(RideId(1), &RideConfig::new("Carousel", 2, 3, 0), Arc::clone(&clock), None).unwrap();
//!
//! ride.queue().enqueue(Ticket::new(VisitorId(7), 0, 30)).unwrap();
//! ride.tick();
//! assert_eq!(ride.status(), RideStatus::Running);
//! ```

pub mod food;
pub mod park;
pub mod queue;
pub mod ride;

// Re-export all public types for convenience
pub use food::*;
pub use park::*;
pub use queue::*;
pub use ride::*;
