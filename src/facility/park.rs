//! Park registry
//!
//! Owns every ride and food stand of a run and answers the questions visitors
//! ask before joining a queue.

use std::sync::Arc;
use tracing::info;

use super::food::FoodStand;
use super::queue::Ticket;
use super::ride::Ride;
use crate::events::MetricsSink;
use crate::simulation::sampling::derive_seed;
use crate::simulation::{ParkResult, QueueError, SimClock};
use crate::types::{IdGenerator, ParkConfig};

/// Priority tier granted to fastpass holders
pub const FASTPASS_TIER: u8 = 1;

/// All facilities of one park run
#[derive(Debug)]
pub struct Park {
    rides: Vec<Arc<Ride>>,
    food_stands: Vec<Arc<FoodStand>>,
    fastpass: bool,
}

impl Park {
    /// Build every ride and food stand described by `config`
    ///
    /// Each food stand draws its service times from its own stream of `seed`.
    pub fn build(
        config: &ParkConfig,
        ids: &IdGenerator,
        clock: &Arc<SimClock>,
        sink: Option<Arc<dyn MetricsSink>>,
        seed: u64,
    ) -> ParkResult<Self> {
        let rides = config
            .rides
            .iter()
            .map(|ride| Ride::new(ids.ride(), ride, Arc::clone(clock), sink.clone()).map(Arc::new))
            .collect::<ParkResult<Vec<_>>>()?;

        let food_stands = config
            .food
            .iter()
            .map(|stand| {
                let id = ids.staff();
                FoodStand::new(id, stand, Arc::clone(clock), sink.clone(), derive_seed(seed, id.value())).map(Arc::new)
            })
            .collect::<ParkResult<Vec<_>>>()?;

        info!("Park built with {} rides and {} food stands", rides.len(), food_stands.len());

        Ok(Self { rides, food_stands, fastpass: config.policy.fastpass })
    }

    /// Every ride, broken or not
    pub fn rides(&self) -> &[Arc<Ride>] {
        &self.rides
    }

    /// Every food stand
    pub fn food_stands(&self) -> &[Arc<FoodStand>] {
        &self.food_stands
    }

    /// Look up a ride by name
    pub fn ride(&self, name: &str) -> Option<&Arc<Ride>> {
        self.rides.iter().find(|ride| ride.name() == name)
    }

    /// Look up a food stand by name
    pub fn food_stand(&self, name: &str) -> Option<&Arc<FoodStand>> {
        self.food_stands.iter().find(|stand| stand.name() == name)
    }

    /// Whether fastpass holders get the priority tier
    pub fn fastpass_enabled(&self) -> bool {
        self.fastpass
    }

    /// Rides currently in service
    pub fn open_rides(&self) -> Vec<&Arc<Ride>> {
        self.rides.iter().filter(|ride| ride.status().accepts_riders()).collect()
    }

    /// Expected minutes before a newcomer boards `ride`
    ///
    /// Full cycles needed to clear the current queue times the cycle length.
    pub fn estimated_wait_minutes(&self, ride: &Ride) -> u64 {
        let cycles = ride.queue().len().div_ceil(ride.capacity()) as u64;
        cycles * ride.run_duration()
    }

    /// Queue a visitor for `ride`, with priority if they hold a fastpass
    pub fn join_ride_queue(&self, ride: &Ride, ticket: Ticket, has_fastpass: bool) -> Result<(), QueueError> {
        let ticket = if self.fastpass && has_fastpass { ticket.with_tier(FASTPASS_TIER) } else { ticket };
        ride.queue().enqueue(ticket)
    }

    /// Queue a visitor for a food stand
    pub fn join_food_queue(&self, stand: &FoodStand, ticket: Ticket) -> Result<(), QueueError> {
        stand.queue().enqueue(ticket)
    }
}
