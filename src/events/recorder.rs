//! Event log writer
//!
//! [`MetricsRecorder`] is the production [`MetricsSink`]: it appends one row per
//! event to a JSON lines or CSV file and folds every event into
//! [`ParkStatistics`]. Write failures are counted and logged, never propagated
//! into the actor that produced the event.

use chrono::{DateTime, Utc};
use csv::Writer;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use super::{MetricsSink, ParkEvent};
use crate::simulation::ParkStatistics;
use crate::types::{OutputFormat, RunId};

/// Errors that can occur when writing the event log
#[derive(Debug, Error)]
pub enum MetricsError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV write error
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for metrics output
pub type MetricsResult<T> = Result<T, MetricsError>;

/// One line of the JSON event log
#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    wall_time: DateTime<Utc>,
    run_id: RunId,
    #[serde(flatten)]
    event: &'a ParkEvent,
}

enum EventWriter {
    Json(BufWriter<File>),
    Csv(Writer<File>),
}

impl EventWriter {
    fn open(path: &Path, format: OutputFormat) -> MetricsResult<Self> {
        match format {
            OutputFormat::Json => Ok(Self::Json(BufWriter::new(File::create(path)?))),
            OutputFormat::Csv => {
                let mut writer = Writer::from_path(path)?;
                writer.write_record(["wall_time", "run_id", "minute", "event", "facility", "visitor", "detail"])?;
                Ok(Self::Csv(writer))
            }
        }
    }

    fn write(&mut self, run_id: RunId, event: &ParkEvent) -> MetricsResult<()> {
        let wall_time = Utc::now();
        match self {
            Self::Json(out) => {
                serde_json::to_writer(&mut *out, &JsonRow { wall_time, run_id, event })?;
                out.write_all(b"\n")?;
            }
            Self::Csv(out) => {
                out.write_record(&[
                    wall_time.to_rfc3339(),
                    run_id.to_string(),
                    event.minute().to_string(),
                    event.name().to_string(),
                    event.facility().unwrap_or_default().to_string(),
                    event.visitor().map(|v| v.to_string()).unwrap_or_default(),
                    csv_detail(event),
                ])?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> MetricsResult<()> {
        match self {
            Self::Json(out) => out.flush()?,
            Self::Csv(out) => out.flush()?,
        }
        Ok(())
    }
}

/// Variant-specific payload squeezed into the CSV `detail` column
fn csv_detail(event: &ParkEvent) -> String {
    match event {
        ParkEvent::Arrival { kind, .. } => kind.to_string(),
        ParkEvent::TicketEnqueued { tier, .. } => format!("tier={}", tier),
        ParkEvent::TicketServed { waited, .. }
        | ParkEvent::TicketAbandoned { waited, .. }
        | ParkEvent::FoodOrdered { waited, .. } => format!("waited={}", waited),
        ParkEvent::RideCycle { riders, capacity, .. } => format!("riders={}/{}", riders, capacity),
        ParkEvent::RideBroke { repair_minutes, .. } => format!("repair={}", repair_minutes),
        ParkEvent::VisitorExit { reason, .. } => reason.clone(),
        ParkEvent::QueueRejected { .. } | ParkEvent::RideRepaired { .. } | ParkEvent::FoodServed { .. } => {
            String::new()
        }
    }
}

struct RecorderState {
    writer: Option<EventWriter>,
    statistics: ParkStatistics,
    write_failures: usize,
}

/// Sink that persists events and keeps running statistics
pub struct MetricsRecorder {
    run_id: RunId,
    state: Mutex<RecorderState>,
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder").field("run_id", &self.run_id).finish_non_exhaustive()
    }
}

impl MetricsRecorder {
    /// Recorder that only keeps statistics
    pub fn in_memory(run_id: RunId) -> Self {
        Self::with_writer(run_id, None)
    }

    /// Recorder that also writes every event to `path`
    pub fn to_file<P: AsRef<Path>>(run_id: RunId, path: P, format: OutputFormat) -> MetricsResult<Self> {
        let path = path.as_ref();
        let writer = EventWriter::open(path, format)?;
        debug!("Writing {:?} event log to {}", format, path.display());
        Ok(Self::with_writer(run_id, Some(writer)))
    }

    fn with_writer(run_id: RunId, writer: Option<EventWriter>) -> Self {
        Self {
            run_id,
            state: Mutex::new(RecorderState {
                writer,
                statistics: ParkStatistics::new(),
                write_failures: 0,
            }),
        }
    }

    /// Run identifier stamped on every row
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Make a ride appear in the statistics even if it never runs
    pub fn register_ride(&self, name: &str) {
        self.state.lock().statistics.register_ride(name);
    }

    /// Snapshot of the statistics so far
    pub fn statistics(&self) -> ParkStatistics {
        self.state.lock().statistics.clone()
    }

    /// Number of rows that could not be written
    pub fn write_failures(&self) -> usize {
        self.state.lock().write_failures
    }

    /// Flush the event log and return the final statistics
    pub fn finish(&self) -> MetricsResult<ParkStatistics> {
        let mut state = self.state.lock();
        if let Some(writer) = state.writer.as_mut() {
            writer.flush()?;
        }
        if state.write_failures > 0 {
            warn!("{} event rows could not be written", state.write_failures);
        }
        Ok(state.statistics.clone())
    }
}

impl MetricsSink for MetricsRecorder {
    fn record(&self, event: ParkEvent) {
        let mut state = self.state.lock();
        state.statistics.record(&event);

        let result = match state.writer.as_mut() {
            Some(writer) => writer.write(self.run_id, &event),
            None => Ok(()),
        };
        if let Err(e) = result {
            state.write_failures += 1;
            // Only the first failure is logged at warn level
            if state.write_failures == 1 {
                warn!("Failed to write {} event: {}", event.name(), e);
            } else {
                debug!("Failed to write {} event: {}", event.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{VisitorId, VisitorKind};
    use tempfile::TempDir;

    fn sample_events() -> Vec<ParkEvent> {
        vec![
            ParkEvent::Arrival { minute: 0, visitor: VisitorId(7), kind: VisitorKind::Tourist },
            ParkEvent::TicketServed {
                minute: 4,
                facility: "Carousel".to_string(),
                visitor: VisitorId(7),
                waited: 3,
            },
            ParkEvent::RideBroke { minute: 5, ride: "Carousel".to_string(), repair_minutes: 2 },
        ]
    }

    #[test]
    fn test_json_lines_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let recorder = MetricsRecorder::to_file(RunId::new(), &path, OutputFormat::Json).unwrap();
        for event in sample_events() {
            recorder.record(event);
        }
        let stats = recorder.finish().unwrap();
        assert_eq!(stats.arrivals, 1);
        assert_eq!(stats.breakdowns, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let row: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(row["event"], "ticket_served");
        assert_eq!(row["waited"], 3);
        assert_eq!(row["visitor"], "VIS_7");
        assert!(row["run_id"].as_str().unwrap().starts_with("RUN_"));
        assert!(row["wall_time"].is_string());
    }

    #[test]
    fn test_csv_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.csv");
        let recorder = MetricsRecorder::to_file(RunId::new(), &path, OutputFormat::Csv).unwrap();
        for event in sample_events() {
            recorder.record(event);
        }
        recorder.finish().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[3], "event");
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][6], "Tourist");
        assert_eq!(&rows[1][4], "Carousel");
        assert_eq!(&rows[2][6], "repair=2");
    }

    #[test]
    fn test_in_memory_recorder() {
        let recorder = MetricsRecorder::in_memory(RunId::new());
        recorder.register_ride("SkyDrop");
        for event in sample_events() {
            recorder.record(event);
        }
        let stats = recorder.statistics();
        assert_eq!(stats.tickets_served, 1);
        assert!(stats.rides.contains_key("SkyDrop"));
        assert_eq!(recorder.write_failures(), 0);
    }
}
