//! Visitor behavior profiles
//!
//! Every visitor is the same record; a [`VisitorProfile`] carries the knobs
//! that make a child behave differently from an adrenaline addict.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::strategy::RideChoice;
use crate::types::VisitorKind;

/// Behavior parameters of a visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorProfile {
    /// Preset this profile was built from
    pub kind: VisitorKind,
    /// Inclusive range of minutes a visitor tolerates in one queue
    pub patience: (u64, u64),
    /// Inclusive range of minutes a visitor stays in the park
    pub time_budget: (u64, u64),
    /// Weight per ride name; unknown rides weigh 1.0
    pub ride_prefs: BTreeMap<String, f64>,
    /// How the next ride is picked
    pub strategy: RideChoice,
    /// Probability of holding a fastpass
    pub fastpass_probability: f64,
    /// Hunger gained per simulated minute
    pub hunger_rate: f64,
    /// Hunger at which the visitor looks for food
    pub hunger_threshold: f64,
    /// Food stands tried first, by name
    pub food_preferences: Vec<String>,
}

fn prefs(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(name, weight)| (name.to_string(), *weight)).collect()
}

impl VisitorProfile {
    /// Preset profile for `kind`
    pub fn preset(kind: VisitorKind) -> Self {
        match kind {
            VisitorKind::Child => Self {
                kind,
                patience: (10, 25),
                time_budget: (120, 240),
                ride_prefs: prefs(&[
                    ("Carousel", 1.6),
                    ("ThunderCoaster", 0.8),
                    ("SkyDrop", 0.5),
                    ("HauntedMansion", 0.7),
                ]),
                strategy: RideChoice::Preference,
                fastpass_probability: 0.2,
                hunger_rate: 1.5,
                hunger_threshold: 30.0,
                food_preferences: vec!["IceCreamStand".to_string()],
            },
            VisitorKind::Tourist => Self {
                kind,
                patience: (15, 45),
                time_budget: (240, 420),
                ride_prefs: BTreeMap::new(),
                strategy: RideChoice::Random,
                fastpass_probability: 0.2,
                hunger_rate: 1.0,
                hunger_threshold: 65.0,
                food_preferences: vec!["BurgerTruck".to_string()],
            },
            VisitorKind::AdrenalineAddict => Self {
                kind,
                patience: (15, 45),
                time_budget: (480, 600),
                ride_prefs: prefs(&[
                    ("Carousel", 0.4),
                    ("ThunderCoaster", 1.8),
                    ("SkyDrop", 1.6),
                    ("HauntedMansion", 0.8),
                ]),
                strategy: RideChoice::PopularityWaitTradeoff { penalty_after: 8 },
                fastpass_probability: 0.4,
                hunger_rate: 0.3,
                hunger_threshold: 75.0,
                food_preferences: vec!["IceCreamStand".to_string()],
            },
        }
    }

    /// Preference weight for a ride
    pub fn preference(&self, ride: &str) -> f64 {
        self.ride_prefs.get(ride).copied().unwrap_or(1.0)
    }
}
