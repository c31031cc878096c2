//! Ride choice strategies

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::profile::VisitorProfile;
use crate::facility::{Park, Ride};

/// How a visitor picks the next ride among the open ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RideChoice {
    /// Uniformly at random
    Random,
    /// Weighted by the profile's ride preferences; zero-weight rides are never picked
    Preference,
    /// Best of preference × popularity, penalized once the expected wait
    /// exceeds `penalty_after` minutes
    PopularityWaitTradeoff {
        /// Expected wait tolerated without penalty
        penalty_after: u64,
    },
}

impl RideChoice {
    /// Pick a ride, or `None` when no ride is open or acceptable
    pub fn pick<'a, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        profile: &VisitorProfile,
        park: &'a Park,
    ) -> Option<&'a Arc<Ride>> {
        let open = park.open_rides();
        if open.is_empty() {
            return None;
        }

        match *self {
            RideChoice::Random => open.choose(rng).copied(),
            RideChoice::Preference => {
                let candidates: Vec<(&Arc<Ride>, f64)> = open
                    .into_iter()
                    .map(|ride| (ride, profile.preference(ride.name())))
                    .filter(|(_, weight)| *weight > 0.0)
                    .collect();
                let index = WeightedIndex::new(candidates.iter().map(|(_, weight)| *weight)).ok()?;
                Some(candidates[index.sample(rng)].0)
            }
            RideChoice::PopularityWaitTradeoff { penalty_after } => {
                let mut best: Option<(&Arc<Ride>, f64)> = None;
                for ride in open {
                    let eta = park.estimated_wait_minutes(ride);
                    let penalty = 1.0 / (1.0 + eta.saturating_sub(penalty_after) as f64);
                    let score = profile.preference(ride.name()) * ride.popularity() * penalty;
                    if best.map_or(true, |(_, best_score)| score > best_score) {
                        best = Some((ride, score));
                    }
                }
                best.map(|(ride, _)| ride)
            }
        }
    }
}
