//! Main simulation orchestrator
//!
//! [`ParkSimulation`] builds the park from configuration, gives every actor its
//! own thread, paces the clock until closing time on the calling thread, then
//! stops and joins everyone and returns the collected statistics.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use super::clock::SimClock;
use super::error::{ParkError, ParkResult};
use super::maintenance::MaintenanceDaemon;
use super::statistics::ParkStatistics;
use crate::events::{MetricsRecorder, MetricsSink};
use crate::facility::Park;
use crate::visitor::{ArrivalGenerator, VisitorSummary};
use crate::types::{IdGenerator, ParkConfig, RunId};

/// Outcome of one park run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Identifier stamped on every event row
    pub run_id: RunId,
    /// Seed the run was driven by
    pub seed: u64,
    /// Aggregated statistics
    pub statistics: ParkStatistics,
    /// Per-visitor summaries
    pub visitors: Vec<VisitorSummary>,
    /// Actors whose thread panicked
    pub panicked_actors: Vec<String>,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run: {} (seed {})", self.run_id, self.seed)?;
        write!(f, "{}", self.statistics)?;
        if !self.panicked_actors.is_empty() {
            writeln!(f, "\nPanicked actors: {}", self.panicked_actors.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Actors {
    facilities: Vec<(String, JoinHandle<()>)>,
    maintenance: Option<JoinHandle<usize>>,
    arrivals: Option<JoinHandle<Vec<JoinHandle<VisitorSummary>>>>,
}

impl Actors {
    /// Join every actor; panics are reported, never propagated
    fn join(self) -> (Vec<VisitorSummary>, Vec<String>) {
        let mut panicked = Vec::new();
        let mut visitors = Vec::new();

        let mut visitor_handles = Vec::new();
        if let Some(handle) = self.arrivals {
            match handle.join() {
                Ok(handles) => visitor_handles = handles,
                Err(_) => panicked.push("arrivals".to_string()),
            }
        }
        for handle in visitor_handles {
            let name = handle.thread().name().unwrap_or("visitor").to_string();
            match handle.join() {
                Ok(summary) => visitors.push(summary),
                Err(_) => panicked.push(name),
            }
        }

        for (name, handle) in self.facilities {
            if handle.join().is_err() {
                panicked.push(name);
            }
        }
        if let Some(handle) = self.maintenance {
            if handle.join().is_err() {
                panicked.push("maintenance".to_string());
            }
        }

        for name in &panicked {
            error!("{}", ParkError::ActorPanicked(name.clone()));
        }
        (visitors, panicked)
    }
}

fn spawn_actor<T, F>(name: String, body: F) -> ParkResult<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|source| ParkError::Spawn { name, source })
}

/// One configured park run
#[derive(Debug)]
pub struct ParkSimulation {
    config: ParkConfig,
    run_id: RunId,
    seed: u64,
}

impl ParkSimulation {
    /// Validate `config` and prepare a run
    #[instrument(skip(config), fields(rides = config.rides.len(), open_minutes = config.time.open_minutes))]
    pub fn new(config: ParkConfig) -> ParkResult<Self> {
        config.validate()?;

        let seed = match config.seed {
            Some(seed) => {
                info!("Using deterministic seed: {}", seed);
                seed
            }
            None => {
                let seed = rand::random();
                info!("Using random seed: {}", seed);
                seed
            }
        };

        Ok(Self { config, run_id: RunId::new(), seed })
    }

    /// Identifier of this run
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Seed driving every random stream of this run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration of this run
    pub fn config(&self) -> &ParkConfig {
        &self.config
    }

    /// Run the park day to completion
    pub fn run(self) -> ParkResult<SimulationReport> {
        let started = Instant::now();
        let config = &self.config;
        info!(
            "Opening park {} for {} simulated minutes at {} min/s",
            self.run_id, config.time.open_minutes, config.time.speed_factor
        );

        let recorder = Arc::new(match &config.metrics_output {
            Some(path) => {
                let format = config.get_output_format().map_err(|e| ParkError::invalid("metrics output", e))?;
                MetricsRecorder::to_file(self.run_id, path, format)?
            }
            None => MetricsRecorder::in_memory(self.run_id),
        });
        let sink: Arc<dyn MetricsSink> = recorder.clone();

        let clock = Arc::new(SimClock::new(config.time.speed_factor, config.time.open_minutes));
        let ids = Arc::new(IdGenerator::new());
        let park = Arc::new(Park::build(config, &ids, &clock, Some(Arc::clone(&sink)), self.seed)?);
        for ride in park.rides() {
            recorder.register_ride(ride.name());
        }

        let maintenance = MaintenanceDaemon::new(park.rides(), &config.maintenance, Arc::clone(&clock), self.seed)?;
        let arrivals = ArrivalGenerator::new(
            &config.arrival,
            Arc::clone(&ids),
            Arc::clone(&park),
            Arc::clone(&clock),
            Some(Arc::clone(&sink)),
            self.seed,
        )?;

        let mut actors = Actors::default();
        if let Err(e) = Self::spawn_all(&park, maintenance, arrivals, &mut actors) {
            warn!("Aborting run: {}", e);
            clock.stop();
            actors.join();
            return Err(e);
        }

        clock.run_until_close();
        clock.stop();
        info!("Park closed at minute {}, waiting for actors", clock.now());

        let (visitors, panicked_actors) = actors.join();
        let mut statistics = recorder.finish()?;
        statistics.set_simulation_duration(started.elapsed());

        info!(
            "Run {} complete: {} visitors, {} served, {} abandoned, {} breakdowns",
            self.run_id,
            statistics.arrivals,
            statistics.tickets_served,
            statistics.tickets_abandoned,
            statistics.breakdowns
        );

        Ok(SimulationReport { run_id: self.run_id, seed: self.seed, statistics, visitors, panicked_actors })
    }

    fn spawn_all(
        park: &Arc<Park>,
        maintenance: MaintenanceDaemon,
        arrivals: ArrivalGenerator,
        actors: &mut Actors,
    ) -> ParkResult<()> {
        for ride in park.rides() {
            let name = format!("ride-{}", ride.name());
            let ride = Arc::clone(ride);
            actors.facilities.push((name.clone(), spawn_actor(name, move || ride.run())?));
        }
        for stand in park.food_stands() {
            let name = format!("food-{}", stand.name());
            let stand = Arc::clone(stand);
            actors.facilities.push((name.clone(), spawn_actor(name, move || stand.run())?));
        }
        actors.maintenance = Some(spawn_actor("maintenance".to_string(), move || maintenance.run())?);
        actors.arrivals = Some(spawn_actor("arrivals".to_string(), move || arrivals.run())?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RideConfig;

    fn quick_config() -> ParkConfig {
        let mut config = ParkConfig::default();
        config.time.speed_factor = 5_000.0;
        config.time.open_minutes = 60;
        config.arrival.total_visitors = 20;
        config.seed = Some(5);
        config
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quick_config();
        config.rides.push(RideConfig::new("Zero", 0, 1, 1));
        let err = ParkSimulation::new(config).unwrap_err();
        assert_eq!(err.category(), "Validation");
    }

    #[test]
    fn test_seed_is_kept() {
        let sim = ParkSimulation::new(quick_config()).unwrap();
        assert_eq!(sim.seed(), 5);
        assert!(sim.run_id().to_string().starts_with("RUN_"));
    }

    #[test]
    fn test_short_run_completes() {
        let report = ParkSimulation::new(quick_config()).unwrap().run().unwrap();
        assert!(report.panicked_actors.is_empty());
        assert!(report.statistics.last_minute <= 60);
        assert_eq!(report.visitors.len(), report.statistics.arrivals);
        assert_eq!(report.statistics.exits, report.statistics.arrivals);
        assert_eq!(report.statistics.rides.len(), 5);
    }
}
