//! Error types and handling
//!
//! Queue and ride conditions are local and recoverable; they are handled where
//! they occur. [`ParkError`] is what crosses actor and process boundaries.

use crate::events::MetricsError;
use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;

/// Rejections from a [`WaitQueue`](crate::facility::WaitQueue)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue is at capacity; the caller decides whether the visitor gives up
    #[error("Queue '{queue}' is full ({capacity} waiting)")]
    QueueFull {
        /// Label of the queue
        queue: String,
        /// Configured capacity
        capacity: usize,
    },
}

/// Rejections from a [`Ride`](crate::facility::Ride) lifecycle operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RideError {
    /// Duplicate break request; the running repair is left untouched
    #[error("Ride '{ride}' is already broken until minute {repaired_at}")]
    AlreadyBroken {
        /// Ride name
        ride: String,
        /// Minute at which the current repair completes
        repaired_at: u64,
    },

    /// Boarding was attempted while the ride is under repair
    #[error("Ride '{ride}' is under repair until minute {repaired_at}")]
    RepairInProgress {
        /// Ride name
        ride: String,
        /// Minute at which the current repair completes
        repaired_at: u64,
    },

    /// The ride was dropped while another actor still referenced it
    #[error("Ride {0} no longer exists")]
    RideGone(String),
}

/// Errors that can occur while building or running a park
#[derive(Debug, Error)]
pub enum ParkError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration failed validation
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ConfigValidationError),

    /// A component was constructed with impossible parameters
    #[error("Invalid {component}: {reason}")]
    InvalidParameter {
        /// Component being constructed
        component: String,
        /// What was wrong
        reason: String,
    },

    /// Queue rejection surfaced to a caller that cannot absorb it
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Ride rejection surfaced to a caller that cannot absorb it
    #[error(transparent)]
    Ride(#[from] RideError),

    /// Metrics output failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// An actor thread could not be spawned
    #[error("Failed to spawn actor '{name}': {source}")]
    Spawn {
        /// Thread name
        name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An actor thread panicked
    #[error("Actor '{0}' panicked")]
    ActorPanicked(String),
}

impl ParkError {
    /// Create an invalid parameter error
    pub fn invalid(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { component: component.into(), reason: reason.into() }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            ParkError::Config(_) => false,
            ParkError::Validation(_) => false,
            ParkError::InvalidParameter { .. } => false,
            ParkError::Queue(_) => true,
            ParkError::Ride(_) => true,
            ParkError::Metrics(_) => true,
            ParkError::Spawn { .. } => false,
            ParkError::ActorPanicked(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            ParkError::Config(_) => "Configuration",
            ParkError::Validation(_) => "Validation",
            ParkError::InvalidParameter { .. } => "Construction",
            ParkError::Queue(_) => "Queue",
            ParkError::Ride(_) => "Ride",
            ParkError::Metrics(_) => "Metrics",
            ParkError::Spawn { .. } => "Threading",
            ParkError::ActorPanicked(_) => "Actor",
        }
    }
}

/// Result type for park operations
pub type ParkResult<T> = Result<T, ParkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let full = QueueError::QueueFull { queue: "Carousel".to_string(), capacity: 3 };
        assert_eq!(full.to_string(), "Queue 'Carousel' is full (3 waiting)");

        let broken = RideError::AlreadyBroken { ride: "SkyDrop".to_string(), repaired_at: 40 };
        assert!(broken.to_string().contains("minute 40"));
    }

    #[test]
    fn test_error_classification() {
        let err = ParkError::invalid("ride", "capacity must be positive");
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), "Construction");

        let err: ParkError = RideError::RideGone("RIDE_1".to_string()).into();
        assert!(err.is_recoverable());
        assert_eq!(err.category(), "Ride");

        let err: ParkError =
            QueueError::QueueFull { queue: "q".to_string(), capacity: 1 }.into();
        assert_eq!(err.category(), "Queue");
    }
}
