//! Park events
//!
//! Everything the core reports to the outside world goes through [`ParkEvent`].

use serde::{Deserialize, Serialize};

use crate::types::{VisitorId, VisitorKind};

/// One observable occurrence in the park, stamped with its simulated minute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ParkEvent {
    /// A visitor entered the park
    Arrival {
        /// Simulated minute
        minute: u64,
        /// Who arrived
        visitor: VisitorId,
        /// Preset the visitor was built from
        kind: VisitorKind,
    },
    /// A ticket joined a queue
    TicketEnqueued {
        /// Simulated minute
        minute: u64,
        /// Ride or food stand name
        facility: String,
        /// Ticket holder
        visitor: VisitorId,
        /// Priority tier of the ticket
        tier: u8,
    },
    /// A queue refused a ticket because it was full
    QueueRejected {
        /// Simulated minute
        minute: u64,
        /// Ride or food stand name
        facility: String,
        /// Ticket holder
        visitor: VisitorId,
    },
    /// A ticket holder completed a ride cycle
    TicketServed {
        /// Simulated minute
        minute: u64,
        /// Ride name
        facility: String,
        /// Ticket holder
        visitor: VisitorId,
        /// Minutes between enqueue and boarding
        waited: u64,
    },
    /// A ticket expired before being served
    TicketAbandoned {
        /// Simulated minute
        minute: u64,
        /// Ride or food stand name
        facility: String,
        /// Ticket holder
        visitor: VisitorId,
        /// Minutes spent in the queue
        waited: u64,
    },
    /// A ride finished a full boarding + running cycle
    RideCycle {
        /// Simulated minute
        minute: u64,
        /// Ride name
        ride: String,
        /// Riders carried
        riders: usize,
        /// Seats available
        capacity: usize,
    },
    /// A ride went out of service
    RideBroke {
        /// Simulated minute
        minute: u64,
        /// Ride name
        ride: String,
        /// Scheduled repair duration
        repair_minutes: u64,
    },
    /// A ride came back into service
    RideRepaired {
        /// Simulated minute
        minute: u64,
        /// Ride name
        ride: String,
    },
    /// A food stand started preparing an order
    FoodOrdered {
        /// Simulated minute
        minute: u64,
        /// Food stand name
        facility: String,
        /// Customer
        visitor: VisitorId,
        /// Minutes spent in the queue
        waited: u64,
    },
    /// A food stand handed over an order
    FoodServed {
        /// Simulated minute
        minute: u64,
        /// Food stand name
        facility: String,
        /// Customer
        visitor: VisitorId,
    },
    /// A visitor left the park
    VisitorExit {
        /// Simulated minute
        minute: u64,
        /// Who left
        visitor: VisitorId,
        /// Why they left
        reason: String,
    },
}

impl ParkEvent {
    /// Simulated minute of the event
    pub fn minute(&self) -> u64 {
        match self {
            ParkEvent::Arrival { minute, .. }
            | ParkEvent::TicketEnqueued { minute, .. }
            | ParkEvent::QueueRejected { minute, .. }
            | ParkEvent::TicketServed { minute, .. }
            | ParkEvent::TicketAbandoned { minute, .. }
            | ParkEvent::RideCycle { minute, .. }
            | ParkEvent::RideBroke { minute, .. }
            | ParkEvent::RideRepaired { minute, .. }
            | ParkEvent::FoodOrdered { minute, .. }
            | ParkEvent::FoodServed { minute, .. }
            | ParkEvent::VisitorExit { minute, .. } => *minute,
        }
    }

    /// Snake-case name of the event, as written to the log
    pub fn name(&self) -> &'static str {
        match self {
            ParkEvent::Arrival { .. } => "arrival",
            ParkEvent::TicketEnqueued { .. } => "ticket_enqueued",
            ParkEvent::QueueRejected { .. } => "queue_rejected",
            ParkEvent::TicketServed { .. } => "ticket_served",
            ParkEvent::TicketAbandoned { .. } => "ticket_abandoned",
            ParkEvent::RideCycle { .. } => "ride_cycle",
            ParkEvent::RideBroke { .. } => "ride_broke",
            ParkEvent::RideRepaired { .. } => "ride_repaired",
            ParkEvent::FoodOrdered { .. } => "food_ordered",
            ParkEvent::FoodServed { .. } => "food_served",
            ParkEvent::VisitorExit { .. } => "visitor_exit",
        }
    }

    /// Ride or food stand the event concerns
    pub fn facility(&self) -> Option<&str> {
        match self {
            ParkEvent::TicketEnqueued { facility, .. }
            | ParkEvent::QueueRejected { facility, .. }
            | ParkEvent::TicketServed { facility, .. }
            | ParkEvent::TicketAbandoned { facility, .. }
            | ParkEvent::FoodOrdered { facility, .. }
            | ParkEvent::FoodServed { facility, .. } => Some(facility),
            ParkEvent::RideCycle { ride, .. }
            | ParkEvent::RideBroke { ride, .. }
            | ParkEvent::RideRepaired { ride, .. } => Some(ride),
            ParkEvent::Arrival { .. } | ParkEvent::VisitorExit { .. } => None,
        }
    }

    /// Visitor the event concerns
    pub fn visitor(&self) -> Option<VisitorId> {
        match self {
            ParkEvent::Arrival { visitor, .. }
            | ParkEvent::TicketEnqueued { visitor, .. }
            | ParkEvent::QueueRejected { visitor, .. }
            | ParkEvent::TicketServed { visitor, .. }
            | ParkEvent::TicketAbandoned { visitor, .. }
            | ParkEvent::FoodOrdered { visitor, .. }
            | ParkEvent::FoodServed { visitor, .. }
            | ParkEvent::VisitorExit { visitor, .. } => Some(*visitor),
            ParkEvent::RideCycle { .. }
            | ParkEvent::RideBroke { .. }
            | ParkEvent::RideRepaired { .. } => None,
        }
    }

    /// Fraction of seats filled, for ride cycles
    pub fn utilization(&self) -> Option<f64> {
        match self {
            ParkEvent::RideCycle { riders, capacity, .. } if *capacity > 0 => {
                Some(*riders as f64 / *capacity as f64)
            }
            _ => None,
        }
    }
}
