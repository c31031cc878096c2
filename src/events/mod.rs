//! Park events and metrics output
//!
//! This module defines the events the core reports and the sinks that receive
//! them.
//!
//! # Overview
//!
//! - **ParkEvent**: every observable occurrence, stamped with its simulated minute
//! - **MetricsSink**: the trait the core reports through
//! - **MemorySink**: keeps events in memory, used by tests
//! - **MetricsRecorder**: writes JSON lines or CSV and keeps running statistics
//!
//! # Usage Example
//!
//! ```rust
//! use theme_park_sim::events::*;
//! use theme_park_sim::types::*;
//!
//! let recorder = MetricsRecorder::in_memory(RunId::new());
//! recorder.record(ParkEvent::RideRepaired { minute: 12, ride: "Carousel".to_string() });
//!
//! let stats = recorder.finish().unwrap();
//! assert_eq!(stats.repairs, 1);
//! ```

pub mod park_event;
pub mod recorder;
pub mod sink;

// Re-export all public types for convenience
pub use park_event::*;
pub use recorder::*;
pub use sink::*;
