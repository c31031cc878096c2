//! Statistics collection and reporting
//!
//! [`ParkStatistics`] folds the park event stream into counters and averages.
//! It is kept by the metrics recorder and returned at the end of a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::events::ParkEvent;

/// Per-ride counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RideStatistics {
    /// Riders who completed a cycle
    pub served: usize,
    /// Tickets that expired in this ride's queue
    pub abandoned: usize,
    /// Completed cycles
    pub cycles: usize,
    /// Seats offered over all completed cycles
    pub seats_offered: usize,
    /// Breakdowns
    pub breakdowns: usize,
    /// Sum of waits of served riders, in minutes
    pub total_wait_minutes: u64,
}

impl RideStatistics {
    /// Mean wait of served riders in minutes
    pub fn average_wait(&self) -> f64 {
        if self.served == 0 {
            0.0
        } else {
            self.total_wait_minutes as f64 / self.served as f64
        }
    }

    /// Fraction of offered seats that were filled
    pub fn utilization(&self) -> f64 {
        if self.seats_offered == 0 {
            0.0
        } else {
            self.served as f64 / self.seats_offered as f64
        }
    }
}

/// Aggregated statistics of one park run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParkStatistics {
    /// Visitors admitted
    pub arrivals: usize,
    /// Visitors who left before close
    pub exits: usize,
    /// Tickets accepted by any queue
    pub tickets_enqueued: usize,
    /// Tickets refused because a queue was full
    pub queue_rejections: usize,
    /// Ride tickets served
    pub tickets_served: usize,
    /// Tickets that expired (rides and food)
    pub tickets_abandoned: usize,
    /// Sum of waits of served ride tickets, in minutes
    pub total_wait_minutes: u64,
    /// Longest wait of a served ride ticket
    pub max_wait_minutes: u64,
    /// Completed ride cycles
    pub ride_cycles: usize,
    /// Breakdowns
    pub breakdowns: usize,
    /// Completed repairs
    pub repairs: usize,
    /// Food orders started
    pub food_orders: usize,
    /// Food orders handed over
    pub food_served: usize,
    /// Latest simulated minute seen
    pub last_minute: u64,
    /// Per-ride breakdown
    pub rides: BTreeMap<String, RideStatistics>,
    /// Wall-clock duration of the run
    pub simulation_duration: Duration,
}

impl ParkStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the counters
    pub fn record(&mut self, event: &ParkEvent) {
        self.last_minute = self.last_minute.max(event.minute());

        match event {
            ParkEvent::Arrival { .. } => self.arrivals += 1,
            ParkEvent::VisitorExit { .. } => self.exits += 1,
            ParkEvent::TicketEnqueued { .. } => self.tickets_enqueued += 1,
            ParkEvent::QueueRejected { .. } => self.queue_rejections += 1,
            ParkEvent::TicketServed { facility, waited, .. } => {
                self.tickets_served += 1;
                self.total_wait_minutes += waited;
                self.max_wait_minutes = self.max_wait_minutes.max(*waited);
                let ride = self.ride_mut(facility);
                ride.served += 1;
                ride.total_wait_minutes += waited;
            }
            ParkEvent::TicketAbandoned { facility, .. } => {
                self.tickets_abandoned += 1;
                if let Some(ride) = self.rides.get_mut(facility.as_str()) {
                    ride.abandoned += 1;
                }
            }
            ParkEvent::RideCycle { ride, capacity, .. } => {
                self.ride_cycles += 1;
                let ride = self.ride_mut(ride);
                ride.cycles += 1;
                ride.seats_offered += capacity;
            }
            ParkEvent::RideBroke { ride, .. } => {
                self.breakdowns += 1;
                self.ride_mut(ride).breakdowns += 1;
            }
            ParkEvent::RideRepaired { .. } => self.repairs += 1,
            ParkEvent::FoodOrdered { .. } => self.food_orders += 1,
            ParkEvent::FoodServed { .. } => self.food_served += 1,
        }
    }

    fn ride_mut(&mut self, name: &str) -> &mut RideStatistics {
        self.rides.entry(name.to_string()).or_default()
    }

    /// Register a ride so it appears in the report even if nothing happens on it
    pub fn register_ride(&mut self, name: &str) {
        self.ride_mut(name);
    }

    /// Set the wall-clock duration of the run
    pub fn set_simulation_duration(&mut self, duration: Duration) {
        self.simulation_duration = duration;
    }

    /// Mean wait of served ride tickets in minutes
    pub fn average_wait(&self) -> f64 {
        if self.tickets_served == 0 {
            0.0
        } else {
            self.total_wait_minutes as f64 / self.tickets_served as f64
        }
    }

    /// Mean seat utilization over all completed cycles
    pub fn average_utilization(&self) -> f64 {
        let seats: usize = self.rides.values().map(|r| r.seats_offered).sum();
        let riders: usize = self.rides.values().map(|r| r.served).sum();
        if seats == 0 {
            0.0
        } else {
            riders as f64 / seats as f64
        }
    }

    /// Share of queue departures that were abandonments, in percent
    pub fn abandonment_percentage(&self) -> f64 {
        let left = self.tickets_served + self.tickets_abandoned;
        if left == 0 {
            0.0
        } else {
            self.tickets_abandoned as f64 / left as f64 * 100.0
        }
    }

    /// Human-readable end-of-run report
    pub fn generate_summary_output(&self) -> String {
        let mut output = String::new();

        output.push_str("Park Simulation Complete\n");
        output.push_str("========================\n\n");

        output.push_str("Summary:\n");
        output.push_str(&format!("   Simulated Minutes: {}\n", self.last_minute));
        output.push_str(&format!(
            "   Duration: {:.2} seconds\n",
            self.simulation_duration.as_secs_f64()
        ));
        output.push_str(&format!(
            "   Visitors: {} arrived, {} left early\n\n",
            self.arrivals, self.exits
        ));

        output.push_str("Queues:\n");
        output.push_str(&format!("   Tickets Enqueued: {}\n", self.tickets_enqueued));
        output.push_str(&format!("   Rejected (queue full): {}\n", self.queue_rejections));
        output.push_str(&format!(
            "   Served: {} (avg wait {:.1} min, max {} min)\n",
            self.tickets_served,
            self.average_wait(),
            self.max_wait_minutes
        ));
        output.push_str(&format!(
            "   Abandoned: {} ({:.1}%)\n\n",
            self.tickets_abandoned,
            self.abandonment_percentage()
        ));

        output.push_str("Rides:\n");
        output.push_str(&format!(
            "   Cycles: {} (avg utilization {:.1}%)\n",
            self.ride_cycles,
            self.average_utilization() * 100.0
        ));
        output.push_str(&format!(
            "   Breakdowns: {}, Repairs: {}\n",
            self.breakdowns, self.repairs
        ));
        for (name, ride) in &self.rides {
            output.push_str(&format!(
                "   - {}: {} served, {} abandoned, {} cycles, {:.1}% full, {} breakdowns, avg wait {:.1} min\n",
                name,
                ride.served,
                ride.abandoned,
                ride.cycles,
                ride.utilization() * 100.0,
                ride.breakdowns,
                ride.average_wait()
            ));
        }

        output.push_str("\nFood:\n");
        output.push_str(&format!(
            "   Orders: {}, Served: {}\n",
            self.food_orders, self.food_served
        ));

        output
    }
}

impl fmt::Display for ParkStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_output())
    }
}
