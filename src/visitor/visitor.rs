//! The visitor actor
//!
//! A visitor alternates between riding and eating until their time budget
//! runs out or the park closes. While queued they sleep on the simulated clock
//! and poll their reply channel once per minute.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tracing::{debug, trace};

use super::profile::VisitorProfile;
use crate::events::{MetricsSink, ParkEvent};
use crate::facility::{Park, Ticket, TicketOutcome, WaitQueue};
use crate::simulation::{QueueError, SimClock};
use crate::types::{VisitorId, VisitorKind};

/// Reason a visitor left
pub const EXIT_TIME_UP: &str = "time_up";
/// Reason a visitor left
pub const EXIT_PARK_CLOSED: &str = "park_closed";

/// What one visitor did during their stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorSummary {
    /// Visitor
    pub id: VisitorId,
    /// Preset the visitor was built from
    pub kind: VisitorKind,
    /// Completed ride cycles
    pub rides_taken: usize,
    /// Food orders received
    pub meals: usize,
    /// Queues given up on
    pub abandoned: usize,
    /// Queues that were full when tried
    pub turned_away: usize,
    /// Why the visitor left
    pub exit_reason: String,
}

enum Wait {
    Outcome(TicketOutcome),
    Closed,
}

/// One park visitor
pub struct Visitor {
    id: VisitorId,
    profile: VisitorProfile,
    patience: u64,
    time_budget: u64,
    has_fastpass: bool,
    hunger: f64,
    rng: StdRng,
    park: Arc<Park>,
    clock: Arc<SimClock>,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl std::fmt::Debug for Visitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor")
            .field("id", &self.id)
            .field("kind", &self.profile.kind)
            .field("patience", &self.patience)
            .field("time_budget", &self.time_budget)
            .field("has_fastpass", &self.has_fastpass)
            .finish_non_exhaustive()
    }
}

impl Visitor {
    /// Create a visitor, drawing patience, budget and fastpass from `rng`
    pub fn new(
        id: VisitorId,
        profile: VisitorProfile,
        mut rng: StdRng,
        park: Arc<Park>,
        clock: Arc<SimClock>,
        sink: Option<Arc<dyn MetricsSink>>,
    ) -> Self {
        let patience = rng.gen_range(profile.patience.0..=profile.patience.1.max(profile.patience.0));
        let time_budget = rng.gen_range(profile.time_budget.0..=profile.time_budget.1.max(profile.time_budget.0));
        let has_fastpass = rng.gen_bool(profile.fastpass_probability.clamp(0.0, 1.0));

        Self { id, profile, patience, time_budget, has_fastpass, hunger: 0.0, rng, park, clock, sink }
    }

    /// Visitor identifier
    pub fn id(&self) -> VisitorId {
        self.id
    }

    /// Behavior profile
    pub fn profile(&self) -> &VisitorProfile {
        &self.profile
    }

    /// Minutes tolerated in one queue
    pub fn patience(&self) -> u64 {
        self.patience
    }

    /// Minutes the visitor plans to stay
    pub fn time_budget(&self) -> u64 {
        self.time_budget
    }

    /// Whether the visitor holds a fastpass
    pub fn has_fastpass(&self) -> bool {
        self.has_fastpass
    }

    /// Whether the visitor is hungry enough to look for food
    pub fn is_hungry(&self) -> bool {
        self.hunger >= self.profile.hunger_threshold
    }

    /// Spend the day in the park; returns when the budget is spent or the park closes
    pub fn run(mut self) -> VisitorSummary {
        let (tx, rx) = mpsc::channel();
        let arrived = self.clock.now();
        let departure = arrived + self.time_budget;
        let mut last_update = arrived;

        let mut summary = VisitorSummary {
            id: self.id,
            kind: self.profile.kind,
            rides_taken: 0,
            meals: 0,
            abandoned: 0,
            turned_away: 0,
            exit_reason: EXIT_PARK_CLOSED.to_string(),
        };

        while !self.clock.should_stop() {
            let now = self.clock.now();
            if now >= departure {
                summary.exit_reason = EXIT_TIME_UP.to_string();
                break;
            }
            self.hunger = (self.hunger + self.profile.hunger_rate * (now - last_update) as f64).min(100.0);
            last_update = now;

            let ate = self.is_hungry() && self.seek_food(&tx, &rx, &mut summary);
            if ate {
                last_update = self.clock.now();
                self.pause(2, 5);
            } else {
                self.take_ride(&tx, &rx, &mut summary);
            }
        }

        let now = self.clock.now();
        debug!(
            "{} ({}) leaving at minute {}: {} rides, {} meals",
            self.id, self.profile.kind, now, summary.rides_taken, summary.meals
        );
        if let Some(sink) = &self.sink {
            sink.record(ParkEvent::VisitorExit { minute: now, visitor: self.id, reason: summary.exit_reason.clone() });
        }
        summary
    }

    fn take_ride(&mut self, tx: &Sender<TicketOutcome>, rx: &Receiver<TicketOutcome>, summary: &mut VisitorSummary) {
        let park = Arc::clone(&self.park);
        let Some(ride) = self.profile.strategy.pick(&mut self.rng, &self.profile, &park) else {
            // Nothing open: wander for a bit
            self.pause(1, 5);
            return;
        };

        let ticket = Ticket::new(self.id, self.clock.now(), self.patience).with_reply(tx.clone());
        match park.join_ride_queue(ride, ticket, self.has_fastpass) {
            Ok(()) => {
                trace!("{} queued for {}", self.id, ride.name());
                match self.wait_for(ride.queue(), rx) {
                    Wait::Outcome(TicketOutcome::RideFinished { .. }) => summary.rides_taken += 1,
                    Wait::Outcome(TicketOutcome::Abandoned { .. }) => summary.abandoned += 1,
                    Wait::Outcome(TicketOutcome::FoodServed { .. }) | Wait::Closed => {}
                }
            }
            Err(QueueError::QueueFull { .. }) => summary.turned_away += 1,
        }
        self.pause(1, 3);
    }

    fn seek_food(&mut self, tx: &Sender<TicketOutcome>, rx: &Receiver<TicketOutcome>, summary: &mut VisitorSummary) -> bool {
        let park = Arc::clone(&self.park);
        let stands = park.food_stands();
        let preferred: Vec<_> =
            stands.iter().filter(|stand| self.profile.food_preferences.iter().any(|name| name == stand.name())).collect();

        let stand = if preferred.is_empty() { stands.iter().choose(&mut self.rng) } else { preferred.into_iter().choose(&mut self.rng) };
        let Some(stand) = stand else {
            return false;
        };

        let ticket = Ticket::new(self.id, self.clock.now(), self.patience).with_reply(tx.clone());
        if park.join_food_queue(stand, ticket).is_err() {
            summary.turned_away += 1;
            return false;
        }
        match self.wait_for(stand.queue(), rx) {
            Wait::Outcome(TicketOutcome::FoodServed { .. }) => {
                summary.meals += 1;
                self.hunger = 0.0;
                true
            }
            Wait::Outcome(TicketOutcome::Abandoned { .. }) => {
                summary.abandoned += 1;
                false
            }
            Wait::Outcome(TicketOutcome::RideFinished { .. }) | Wait::Closed => false,
        }
    }

    /// Sleep minute by minute until the ticket's outcome arrives or the park closes
    fn wait_for(&self, queue: &WaitQueue, rx: &Receiver<TicketOutcome>) -> Wait {
        loop {
            match rx.try_recv() {
                Ok(outcome) => return Wait::Outcome(outcome),
                Err(TryRecvError::Disconnected) => return Wait::Closed,
                Err(TryRecvError::Empty) => {}
            }
            if self.clock.should_stop() {
                queue.remove(self.id);
                return Wait::Closed;
            }
            self.clock.sleep_minutes(1);
        }
    }

    fn pause(&mut self, min: u64, max: u64) {
        let minutes = self.rng.gen_range(min..=max);
        self.clock.sleep_minutes(minutes);
    }
}
