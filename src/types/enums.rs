//! Enumeration types for the park simulator
//!
//! This module contains the enumerations shared across the simulation:
//! ride lifecycle status, visitor kinds and output formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a ride
///
/// This is the single source of truth for "is this ride usable"; every ride
/// reports its status through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideStatus {
    /// Empty and accepting riders
    Idle,
    /// Pulling tickets from the queue, up to capacity
    Boarding,
    /// Cycle in progress, no new boarders
    Running,
    /// Out of service until repaired
    Broken,
}

impl RideStatus {
    /// Whether visitors should consider joining this ride's queue
    pub fn accepts_riders(&self) -> bool {
        !matches!(self, RideStatus::Broken)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RideStatus::Idle => write!(f, "IDLE"),
            RideStatus::Boarding => write!(f, "BOARDING"),
            RideStatus::Running => write!(f, "RUNNING"),
            RideStatus::Broken => write!(f, "BROKEN"),
        }
    }
}

/// Kinds of visitors arriving at the park
///
/// A kind only selects a preset behavior profile; every visitor is the same
/// record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VisitorKind {
    /// Short stays, low patience, hungry often
    Child,
    /// Moderate stays, picks rides at random
    Tourist,
    /// Stays until close, chases popular rides
    AdrenalineAddict,
}

impl VisitorKind {
    /// All visitor kinds in declaration order
    pub const ALL: [VisitorKind; 3] =
        [VisitorKind::Child, VisitorKind::Tourist, VisitorKind::AdrenalineAddict];
}

impl fmt::Display for VisitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitorKind::Child => write!(f, "Child"),
            VisitorKind::Tourist => write!(f, "Tourist"),
            VisitorKind::AdrenalineAddict => write!(f, "AdrenalineAddict"),
        }
    }
}

impl FromStr for VisitorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "child" => Ok(VisitorKind::Child),
            "tourist" => Ok(VisitorKind::Tourist),
            "adrenalineaddict" | "adrenaline addict" | "adrenaline_addict" => {
                Ok(VisitorKind::AdrenalineAddict)
            }
            _ => Err(format!("Unknown visitor kind: {}", s)),
        }
    }
}

/// Output format for the metrics event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// CSV with a header row
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
