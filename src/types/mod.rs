//! Core types and identifiers for the park simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: monotonic ids for rides, visitors and staff, plus a UUID run id
//! - **Enums**: ride status, visitor kinds and output formats
//! - **Configuration**: park configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use theme_park_sim::types::*;
//!
//! let ids = IdGenerator::new();
//! let ride_id = ids.ride();
//! let visitor_id = ids.visitor();
//! assert!(visitor_id.value() > ride_id.value());
//!
//! let config = ParkConfig::default();
//! assert!(config.validate().is_ok());
//! assert!(RideStatus::Idle.accepts_riders());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
