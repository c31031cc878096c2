//! Visitors and the arrival process
//!
//! This module drives load into the park.
//!
//! # Overview
//!
//! - **VisitorProfile**: behavior parameters, with one preset per [`VisitorKind`](crate::types::VisitorKind)
//! - **RideChoice**: random, preference-weighted or popularity/wait trade-off ride picking
//! - **Visitor**: the actor alternating between rides and food
//! - **ArrivalGenerator**: Poisson arrivals along a piecewise-linear curve
//!
//! # Usage Example
//!
//! ```rust
//! use theme_park_sim::types::VisitorKind;
//! use theme_park_sim::visitor::*;
//!
//! let child = VisitorProfile::preset(VisitorKind::Child);
//! assert_eq!(child.strategy, RideChoice::Preference);
//! assert!(child.preference("Carousel") > child.preference("SkyDrop"));
//! ```

pub mod arrival;
pub mod profile;
pub mod strategy;
#[allow(clippy::module_inception)]
pub mod visitor;

// Re-export all public types for convenience
pub use arrival::*;
pub use profile::*;
pub use strategy::*;
pub use visitor::*;
