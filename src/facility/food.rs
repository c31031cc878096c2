//! Food stands
//!
//! A stand is a staff actor serving a FIFO queue: it prepares up to `capacity`
//! orders at once, each taking a uniformly drawn service time.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info};

use super::queue::{Ticket, TicketOutcome, WaitQueue};
use crate::events::{MetricsSink, ParkEvent};
use crate::simulation::{ParkError, ParkResult, SimClock};
use crate::types::{FoodConfig, StaffId};

#[derive(Debug)]
struct Order {
    ticket: Ticket,
    ready_at: u64,
}

#[derive(Debug)]
struct Kitchen {
    in_flight: Vec<Order>,
    rng: StdRng,
}

/// A staffed food stand with its own order queue
pub struct FoodStand {
    id: StaffId,
    name: String,
    service_time: (u64, u64),
    capacity: usize,
    queue: Arc<WaitQueue>,
    clock: Arc<SimClock>,
    sink: Option<Arc<dyn MetricsSink>>,
    kitchen: Mutex<Kitchen>,
}

impl std::fmt::Debug for FoodStand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodStand")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl FoodStand {
    /// Build a stand from configuration; `seed` drives its service times
    pub fn new(
        id: StaffId,
        config: &FoodConfig,
        clock: Arc<SimClock>,
        sink: Option<Arc<dyn MetricsSink>>,
        seed: u64,
    ) -> ParkResult<Self> {
        let (min, max) = config.service_time;
        if config.capacity == 0 {
            return Err(ParkError::invalid(format!("food stand '{}'", config.name), "capacity must be greater than 0"));
        }
        if min == 0 || min > max {
            return Err(ParkError::invalid(
                format!("food stand '{}'", config.name),
                format!("service time range {}..={} is empty", min, max),
            ));
        }

        let mut queue = WaitQueue::new(config.name.clone(), None, Arc::clone(&clock));
        if let Some(sink) = &sink {
            queue = queue.with_sink(Arc::clone(sink));
        }

        Ok(Self {
            id,
            name: config.name.clone(),
            service_time: (min, max),
            capacity: config.capacity,
            queue: Arc::new(queue),
            clock,
            sink,
            kitchen: Mutex::new(Kitchen { in_flight: Vec::new(), rng: StdRng::seed_from_u64(seed) }),
        })
    }

    /// Stand identifier
    pub fn id(&self) -> StaffId {
        self.id
    }

    /// Stand name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Orders prepared in parallel
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The order queue
    pub fn queue(&self) -> &Arc<WaitQueue> {
        &self.queue
    }

    /// Orders currently being prepared
    pub fn in_flight(&self) -> usize {
        self.kitchen.lock().in_flight.len()
    }

    /// Hand over finished orders, then start new ones in the free slots
    pub fn tick(&self) {
        let now = self.clock.now();
        self.queue.expire_now();

        let mut events = Vec::new();
        {
            let mut kitchen = self.kitchen.lock();
            self.hand_over(&mut kitchen, now, &mut events);

            let free = self.capacity.saturating_sub(kitchen.in_flight.len());
            if free > 0 {
                for ticket in self.queue.dequeue_up_to(free) {
                    let cook = kitchen.rng.gen_range(self.service_time.0..=self.service_time.1);
                    events.push(ParkEvent::FoodOrdered {
                        minute: now,
                        facility: self.name.clone(),
                        visitor: ticket.holder,
                        waited: ticket.waited(now),
                    });
                    kitchen.in_flight.push(Order { ticket, ready_at: now + cook });
                }
            }
        }

        if let Some(sink) = &self.sink {
            for event in events {
                sink.record(event);
            }
        }
    }

    /// Tick once per simulated minute until the clock stops
    pub fn run(&self) {
        info!("Food stand {} ({}) open", self.name, self.id);
        while !self.clock.should_stop() {
            self.tick();
            self.clock.sleep_minutes(1);
        }

        // Orders due at closing time are still handed over
        let mut events = Vec::new();
        self.hand_over(&mut self.kitchen.lock(), self.clock.now(), &mut events);
        if let Some(sink) = &self.sink {
            for event in events {
                sink.record(event);
            }
        }
        info!("Food stand {} closed", self.name);
    }

    fn hand_over(&self, kitchen: &mut Kitchen, now: u64, events: &mut Vec<ParkEvent>) {
        let (ready, cooking): (Vec<Order>, Vec<Order>) =
            kitchen.in_flight.drain(..).partition(|order| order.ready_at <= now);
        kitchen.in_flight = cooking;

        for order in ready {
            debug!("{} served {}", self.name, order.ticket.holder);
            order.ticket.notify(TicketOutcome::FoodServed { stand: self.name.clone() });
            events.push(ParkEvent::FoodServed {
                minute: now,
                facility: self.name.clone(),
                visitor: order.ticket.holder,
            });
        }
    }
}
