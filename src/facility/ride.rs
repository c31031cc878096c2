//! Ride actor and its lifecycle state machine
//!
//! A ride cycles Idle → Boarding → Running → Idle, one simulated minute per
//! [`Ride::tick`]. The maintenance daemon can force it into Broken at any
//! point through [`Ride::break_for`]; riders already pulled from the queue go
//! back to its front. Repairs complete on their own once the repair minute is
//! reached.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::queue::{Ticket, TicketOutcome, WaitQueue};
use crate::events::{MetricsSink, ParkEvent};
use crate::park_event;
use crate::simulation::{ParkError, ParkResult, RideError, SimClock};
use crate::types::{RideConfig, RideId, RideStatus};

#[derive(Debug)]
struct Boarded {
    ticket: Ticket,
    boarded_at: u64,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Boarding { opened_at: u64, riders: Vec<Boarded> },
    Running { riders: Vec<Boarded>, finishes_at: u64 },
    Broken { since: u64, repaired_at: u64 },
}

impl Phase {
    fn status(&self) -> RideStatus {
        match self {
            Phase::Idle => RideStatus::Idle,
            Phase::Boarding { .. } => RideStatus::Boarding,
            Phase::Running { .. } => RideStatus::Running,
            Phase::Broken { .. } => RideStatus::Broken,
        }
    }
}

/// A ride with its own wait queue
pub struct Ride {
    id: RideId,
    name: String,
    capacity: usize,
    run_duration: u64,
    board_window: u64,
    popularity: f64,
    queue: Arc<WaitQueue>,
    clock: Arc<SimClock>,
    sink: Option<Arc<dyn MetricsSink>>,
    phase: Mutex<Phase>,
}

impl std::fmt::Debug for Ride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ride")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("status", &self.status())
            .finish()
    }
}

impl Ride {
    /// Build a ride and its queue from configuration
    ///
    /// A capacity of zero is rejected; such a ride could never serve anyone.
    #[instrument(skip(clock, sink), fields(ride = %config.name))]
    pub fn new(
        id: RideId,
        config: &RideConfig,
        clock: Arc<SimClock>,
        sink: Option<Arc<dyn MetricsSink>>,
    ) -> ParkResult<Self> {
        if config.capacity == 0 {
            return Err(ParkError::invalid(
                format!("ride '{}'", config.name),
                "capacity must be greater than 0",
            ));
        }
        if config.queue_capacity == 0 {
            return Err(ParkError::invalid(
                format!("ride '{}'", config.name),
                "queue capacity must be greater than 0",
            ));
        }

        let mut queue = WaitQueue::new(config.name.clone(), Some(config.queue_capacity), Arc::clone(&clock))
            .with_batch_limit(config.capacity);
        if let Some(sink) = &sink {
            queue = queue.with_sink(Arc::clone(sink));
        }

        debug!(
            "Built ride {} ({} seats, {} min cycle, {} min window)",
            id, config.capacity, config.run_duration, config.board_window
        );

        Ok(Self {
            id,
            name: config.name.clone(),
            capacity: config.capacity,
            run_duration: config.run_duration.max(1),
            board_window: config.board_window,
            popularity: config.popularity,
            queue: Arc::new(queue),
            clock,
            sink,
            phase: Mutex::new(Phase::Idle),
        })
    }

    /// Ride identifier
    pub fn id(&self) -> RideId {
        self.id
    }

    /// Ride name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seats per cycle
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Minutes one cycle runs
    pub fn run_duration(&self) -> u64 {
        self.run_duration
    }

    /// Relative attractiveness
    pub fn popularity(&self) -> f64 {
        self.popularity
    }

    /// The queue in front of this ride
    pub fn queue(&self) -> &Arc<WaitQueue> {
        &self.queue
    }

    /// Current lifecycle status
    ///
    /// A repair whose completion minute has been reached already reads as idle,
    /// even before the ride thread has observed it.
    pub fn status(&self) -> RideStatus {
        let now = self.clock.now();
        match &*self.phase.lock() {
            Phase::Broken { repaired_at, .. } if now >= *repaired_at => RideStatus::Idle,
            phase => phase.status(),
        }
    }

    /// Whether the ride is out of service
    pub fn is_broken(&self) -> bool {
        self.status() == RideStatus::Broken
    }

    /// Minute the running repair completes, if the ride is broken
    pub fn repaired_at(&self) -> Option<u64> {
        let now = self.clock.now();
        match &*self.phase.lock() {
            Phase::Broken { repaired_at, .. } if now < *repaired_at => Some(*repaired_at),
            _ => None,
        }
    }

    /// Riders currently boarded or riding
    pub fn riders_on_board(&self) -> usize {
        match &*self.phase.lock() {
            Phase::Boarding { riders, .. } | Phase::Running { riders, .. } => riders.len(),
            Phase::Idle | Phase::Broken { .. } => 0,
        }
    }

    /// Take the ride out of service for `repair_minutes` (at least 1)
    ///
    /// Riders pulled from the queue but not yet served return to the queue
    /// front. Returns the repair completion minute.
    pub fn break_for(&self, repair_minutes: u64) -> Result<u64, RideError> {
        let now = self.clock.now();
        let mut events = Vec::new();

        let result = {
            let mut phase = self.phase.lock();
            self.settle_repair(&mut phase, now, &mut events);

            if let Phase::Broken { repaired_at, .. } = *phase {
                debug!("Ignoring break request for {}: already broken until {}", self.name, repaired_at);
                Err(RideError::AlreadyBroken { ride: self.name.clone(), repaired_at })
            } else {
                let repair = repair_minutes.max(1);
                let repaired_at = now + repair;
                let pulled = match std::mem::replace(&mut *phase, Phase::Broken { since: now, repaired_at }) {
                    Phase::Boarding { riders, .. } | Phase::Running { riders, .. } => riders,
                    Phase::Idle | Phase::Broken { .. } => Vec::new(),
                };

                let returned = pulled.len();
                self.queue.requeue_front(pulled.into_iter().map(|b| b.ticket).collect());

                park_event!(
                    info,
                    "Ride broke down",
                    ride = self.name.as_str(),
                    minute = now,
                    repair_minutes = repair,
                    riders_returned = returned,
                );
                events.push(ParkEvent::RideBroke { minute: now, ride: self.name.clone(), repair_minutes: repair });
                Ok(repaired_at)
            }
        };

        self.emit_all(events);
        result
    }

    /// Pull riders from the queue into free seats
    ///
    /// Starts a boarding round when the ride is idle. A running ride takes no
    /// one; a broken ride refuses and leaves every ticket queued.
    pub fn board(&self) -> Result<usize, RideError> {
        let now = self.clock.now();
        let mut events = Vec::new();

        let result = {
            let mut phase = self.phase.lock();
            self.settle_repair(&mut phase, now, &mut events);

            if let Phase::Idle = *phase {
                *phase = Phase::Boarding { opened_at: now, riders: Vec::new() };
            }
            match &mut *phase {
                Phase::Broken { repaired_at, .. } => {
                    Err(RideError::RepairInProgress { ride: self.name.clone(), repaired_at: *repaired_at })
                }
                Phase::Boarding { riders, .. } => Ok(self.pull(riders, now)),
                Phase::Running { .. } | Phase::Idle => Ok(0),
            }
        };

        self.emit_all(events);
        result
    }

    /// Do one simulated minute of work
    pub fn tick(&self) {
        let now = self.clock.now();
        let mut events = Vec::new();

        // Patience runs out whether or not the ride is moving
        self.queue.expire_now();

        {
            let mut phase = self.phase.lock();
            self.settle_repair(&mut phase, now, &mut events);

            if matches!(*phase, Phase::Idle) && !self.queue.is_empty() {
                *phase = Phase::Boarding { opened_at: now, riders: Vec::new() };
            }

            let next = match std::mem::replace(&mut *phase, Phase::Idle) {
                Phase::Boarding { opened_at, mut riders } => {
                    self.pull(&mut riders, now);
                    let window_closed = now >= opened_at + self.board_window;

                    if riders.len() >= self.capacity || (window_closed && !riders.is_empty()) {
                        debug!("{} launching with {}/{} riders", self.name, riders.len(), self.capacity);
                        Phase::Running { riders, finishes_at: now + self.run_duration }
                    } else if window_closed {
                        Phase::Idle
                    } else {
                        Phase::Boarding { opened_at, riders }
                    }
                }
                Phase::Running { riders, finishes_at } if now >= finishes_at => {
                    self.complete_cycle(riders, now, &mut events);
                    Phase::Idle
                }
                other => other,
            };
            *phase = next;
        }

        self.emit_all(events);
    }

    /// Tick once per simulated minute until the clock stops
    pub fn run(&self) {
        info!("Ride {} ({}) open", self.name, self.id);
        while !self.clock.should_stop() {
            self.tick();
            self.clock.sleep_minutes(1);
        }
        info!("Ride {} closed with {} still queued", self.name, self.queue.len());
    }

    fn pull(&self, riders: &mut Vec<Boarded>, now: u64) -> usize {
        let free = self.capacity.saturating_sub(riders.len());
        if free == 0 {
            return 0;
        }
        let tickets = self.queue.dequeue_up_to(free);
        let pulled = tickets.len();
        riders.extend(tickets.into_iter().map(|ticket| Boarded { ticket, boarded_at: now }));
        pulled
    }

    fn settle_repair(&self, phase: &mut Phase, now: u64, events: &mut Vec<ParkEvent>) {
        if let Phase::Broken { since, repaired_at } = *phase {
            if now >= repaired_at {
                *phase = Phase::Idle;
                park_event!(info, "Ride repaired", ride = self.name.as_str(), minute = now, down_for = now - since);
                events.push(ParkEvent::RideRepaired { minute: now, ride: self.name.clone() });
            }
        }
    }

    fn complete_cycle(&self, riders: Vec<Boarded>, now: u64, events: &mut Vec<ParkEvent>) {
        let count = riders.len();
        for rider in riders {
            let waited = rider.boarded_at.saturating_sub(rider.ticket.enqueued_at);
            rider.ticket.notify(TicketOutcome::RideFinished { ride: self.name.clone(), waited });
            events.push(ParkEvent::TicketServed {
                minute: now,
                facility: self.name.clone(),
                visitor: rider.ticket.holder,
                waited,
            });
        }
        debug!("{} finished a cycle with {}/{} riders", self.name, count, self.capacity);
        events.push(ParkEvent::RideCycle {
            minute: now,
            ride: self.name.clone(),
            riders: count,
            capacity: self.capacity,
        });
    }

    fn emit_all(&self, events: Vec<ParkEvent>) {
        if let Some(sink) = &self.sink {
            for event in events {
                sink.record(event);
            }
        }
    }
}
