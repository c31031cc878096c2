//! Arrival generator
//!
//! Admits visitors minute by minute. The mean arrival rate follows a
//! piecewise-linear curve through the configured control points, clamped at
//! both ends; the count for each minute is Poisson distributed around it.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use super::profile::VisitorProfile;
use super::visitor::{Visitor, VisitorSummary};
use crate::events::{MetricsSink, ParkEvent};
use crate::facility::Park;
use crate::simulation::sampling::{poisson, stream_rng};
use crate::simulation::{ParkError, ParkResult, SimClock};
use crate::types::{ArrivalConfig, CurvePoint, IdGenerator, VisitorKind};

/// Stream number reserved for the generator's own draws
const ARRIVAL_STREAM: u64 = u64::MAX;

/// Background actor admitting visitors
pub struct ArrivalGenerator {
    points: Vec<CurvePoint>,
    kinds: Vec<VisitorKind>,
    mix: WeightedIndex<f64>,
    jitter: f64,
    total_visitors: usize,
    admitted: usize,
    seed: u64,
    rng: StdRng,
    ids: Arc<IdGenerator>,
    park: Arc<Park>,
    clock: Arc<SimClock>,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl std::fmt::Debug for ArrivalGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrivalGenerator")
            .field("points", &self.points)
            .field("kinds", &self.kinds)
            .field("total_visitors", &self.total_visitors)
            .field("admitted", &self.admitted)
            .finish_non_exhaustive()
    }
}

impl ArrivalGenerator {
    /// Create a generator; fails on an empty curve or a mix without positive weight
    pub fn new(
        config: &ArrivalConfig,
        ids: Arc<IdGenerator>,
        park: Arc<Park>,
        clock: Arc<SimClock>,
        sink: Option<Arc<dyn MetricsSink>>,
        seed: u64,
    ) -> ParkResult<Self> {
        if config.curve_points.is_empty() {
            return Err(ParkError::invalid("arrival generator", "arrival curve has no points"));
        }
        let mut points = config.curve_points.clone();
        points.sort_by_key(|p| p.minute);

        let kinds: Vec<VisitorKind> = config.visitor_mix.keys().copied().collect();
        let mix = WeightedIndex::new(config.visitor_mix.values().copied())
            .map_err(|e| ParkError::invalid("arrival generator", format!("visitor mix: {}", e)))?;

        Ok(Self {
            points,
            kinds,
            mix,
            jitter: config.jitter.max(0.0),
            total_visitors: config.total_visitors,
            admitted: 0,
            seed,
            rng: stream_rng(seed, ARRIVAL_STREAM),
            ids,
            park,
            clock,
            sink,
        })
    }

    /// Visitors admitted so far
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// Mean arrivals per minute at `minute`
    pub fn mean_at(&self, minute: u64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if minute <= first.minute {
            return first.mean;
        }
        if minute >= last.minute {
            return last.mean;
        }

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.minute <= minute && minute <= b.minute {
                let span = b.minute - a.minute;
                if span == 0 {
                    return a.mean;
                }
                let t = (minute - a.minute) as f64 / span as f64;
                return a.mean + t * (b.mean - a.mean);
            }
        }
        last.mean
    }

    fn sample_count(&mut self, mean: f64) -> u64 {
        if mean <= 0.0 {
            return 0;
        }
        let lambda = if self.jitter > 0.0 { mean + self.rng.gen_range(-self.jitter..=self.jitter) } else { mean };
        poisson(&mut self.rng, lambda.max(0.0))
    }

    /// Create this minute's visitors and report their arrival
    ///
    /// Never admits more than the configured total over the whole run.
    pub fn admit(&mut self) -> Vec<Visitor> {
        let minute = self.clock.now();
        let remaining = self.total_visitors.saturating_sub(self.admitted);
        let mean = self.mean_at(minute);
        let count = (self.sample_count(mean) as usize).min(remaining);

        let mut visitors = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = self.kinds[self.mix.sample(&mut self.rng)];
            let id = self.ids.visitor();
            let visitor = Visitor::new(
                id,
                VisitorProfile::preset(kind),
                stream_rng(self.seed, id.value()),
                Arc::clone(&self.park),
                Arc::clone(&self.clock),
                self.sink.clone(),
            );
            if let Some(sink) = &self.sink {
                sink.record(ParkEvent::Arrival { minute, visitor: id, kind });
            }
            visitors.push(visitor);
        }

        self.admitted += count;
        if count > 0 {
            debug!("Minute {}: admitted {} visitors ({} total)", minute, count, self.admitted);
        }
        visitors
    }

    /// Admit visitors every minute until closing or the total is reached
    ///
    /// Each visitor runs on its own thread; the handles are returned so the
    /// caller can join them. A visitor whose thread cannot be spawned is
    /// dropped with a warning.
    pub fn run(mut self) -> Vec<JoinHandle<VisitorSummary>> {
        info!("Gates open: admitting up to {} visitors", self.total_visitors);
        let mut handles = Vec::new();

        while !self.clock.should_stop() && self.admitted < self.total_visitors {
            for visitor in self.admit() {
                let name = format!("visitor-{}", visitor.id().value());
                match thread::Builder::new().name(name.clone()).spawn(move || visitor.run()) {
                    Ok(handle) => handles.push(handle),
                    Err(e) => warn!("{}", ParkError::Spawn { name, source: e }),
                }
            }
            self.clock.sleep_minutes(1);
        }

        info!("Gates closed after {} visitors", self.admitted);
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::types::ParkConfig;
    use std::collections::BTreeMap;

    fn generator(config: &ArrivalConfig) -> (Arc<SimClock>, Arc<MemorySink>, ArrivalGenerator) {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let sink = Arc::new(MemorySink::new());
        let ids = Arc::new(IdGenerator::new());
        let park = Arc::new(Park::build(&ParkConfig::default(), &ids, &clock, None, 0).unwrap());
        let generator =
            ArrivalGenerator::new(config, ids, park, Arc::clone(&clock), Some(sink.clone()), 11).unwrap();
        (clock, sink, generator)
    }

    fn curve(points: &[(u64, f64)]) -> ArrivalConfig {
        ArrivalConfig {
            curve_points: points.iter().map(|&(minute, mean)| CurvePoint { minute, mean }).collect(),
            ..ArrivalConfig::default()
        }
    }

    #[test]
    fn test_curve_interpolates_and_clamps() {
        let (_, _, gen) = generator(&curve(&[(100, 6.0), (0, 2.0), (200, 0.0)]));
        assert_eq!(gen.mean_at(0), 2.0);
        assert_eq!(gen.mean_at(50), 4.0);
        assert_eq!(gen.mean_at(100), 6.0);
        assert_eq!(gen.mean_at(150), 3.0);
        assert_eq!(gen.mean_at(500), 0.0);
    }

    #[test]
    fn test_total_visitors_cap() {
        let mut config = curve(&[(0, 25.0)]);
        config.total_visitors = 30;
        let (clock, sink, mut gen) = generator(&config);

        let mut admitted = 0;
        for _ in 0..10 {
            admitted += gen.admit().len();
            clock.advance(1);
        }
        assert_eq!(admitted, 30);
        assert_eq!(gen.admitted(), 30);
        assert_eq!(sink.count("arrival"), 30);
    }

    #[test]
    fn test_mix_only_yields_weighted_kinds() {
        let mut config = curve(&[(0, 10.0)]);
        let mut mix = BTreeMap::new();
        mix.insert(VisitorKind::Child, 1.0);
        mix.insert(VisitorKind::Tourist, 0.0);
        config.visitor_mix = mix;
        let (_, _, mut gen) = generator(&config);

        for visitor in gen.admit() {
            assert_eq!(visitor.profile().kind, VisitorKind::Child);
        }
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let ids = Arc::new(IdGenerator::new());
        let park = Arc::new(Park::build(&ParkConfig::default(), &ids, &clock, None, 0).unwrap());

        let empty = curve(&[]);
        assert!(ArrivalGenerator::new(&empty, Arc::clone(&ids), Arc::clone(&park), Arc::clone(&clock), None, 0).is_err());

        let mut zero_mix = curve(&[(0, 1.0)]);
        zero_mix.visitor_mix = BTreeMap::from([(VisitorKind::Child, 0.0)]);
        assert!(ArrivalGenerator::new(&zero_mix, ids, park, clock, None, 0).is_err());
    }
}
