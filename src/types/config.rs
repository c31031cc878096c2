//! Configuration structures for the park simulator
//!
//! This module contains the park configuration, the partial configuration file
//! overlay, the command line arguments and the validation logic that guards
//! the constructors of the core components.

use super::{OutputFormat, VisitorKind};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "theme-park-sim",
    version = "0.1.0",
    about = "Theme Park Simulator - concurrent rides, queues and breakdowns under a simulated clock",
    long_about = "Runs an amusement park day: every ride, food stand and visitor is its own thread, \
rides break down and get repaired while visitors wait, and every event is logged.

EXAMPLES:
    # Run with default settings
    theme-park-sim

    # Use a configuration file
    theme-park-sim --config park.json

    # Faster clock, shorter day, reproducible
    theme-park-sim --speed-factor 60 --open-minutes 240 --seed 7

    # Generate configuration template
    theme-park-sim --print-config > my-park.json

    # Validate configuration without running
    theme-park-sim --config my-park.json --dry-run

CONFIGURATION:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag, JSON)
    3. Default values (lowest priority)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Simulated minutes per real second
    #[arg(long, help = "Simulated minutes per real second (must be > 0)")]
    pub speed_factor: Option<f64>,

    /// Opening hours in simulated minutes
    #[arg(long, help = "Opening hours in simulated minutes")]
    pub open_minutes: Option<u64>,

    /// Total number of visitors admitted during the day
    #[arg(long, help = "Total number of visitors admitted")]
    pub total_visitors: Option<usize>,

    /// Mean simulated minutes between ride breakdowns
    #[arg(long, help = "Mean ride uptime in simulated minutes")]
    pub mean_uptime: Option<f64>,

    /// Mean simulated minutes to repair a ride
    #[arg(long, help = "Mean repair duration in simulated minutes")]
    pub mean_repair: Option<f64>,

    /// Enable fastpass priority lanes
    #[arg(long, help = "Enable fastpass priority lanes")]
    pub fastpass: bool,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Path of the metrics event log
    #[arg(long, help = "Write every park event to this file")]
    pub metrics_output: Option<String>,

    /// Output format for the metrics event log
    #[arg(long, help = "Metrics output format (json or csv)")]
    pub output_format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Simulated minutes per real second
    pub speed_factor: f64,
    /// Opening hours in simulated minutes
    pub open_minutes: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self { speed_factor: 10.0, open_minutes: 600 }
    }
}

/// One ride of the park
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideConfig {
    /// Display name, also the key of visitor preferences
    pub name: String,
    /// Seats per cycle
    pub capacity: usize,
    /// Simulated minutes one cycle runs
    pub run_duration: u64,
    /// Simulated minutes the ride waits to fill empty seats
    pub board_window: u64,
    /// Maximum tickets waiting in the queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Relative attractiveness (0.0-1.0)
    #[serde(default = "default_popularity")]
    pub popularity: f64,
}

fn default_queue_capacity() -> usize {
    100
}

fn default_popularity() -> f64 {
    0.5
}

impl RideConfig {
    /// Convenience constructor with default queue capacity and popularity
    pub fn new(name: impl Into<String>, capacity: usize, run_duration: u64, board_window: u64) -> Self {
        Self {
            name: name.into(),
            capacity,
            run_duration,
            board_window,
            queue_capacity: default_queue_capacity(),
            popularity: default_popularity(),
        }
    }

    /// Set the popularity
    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = popularity;
        self
    }

    /// Set the queue capacity
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }
}

/// One food stand of the park
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodConfig {
    /// Display name
    pub name: String,
    /// Inclusive (min, max) service time in simulated minutes
    pub service_time: (u64, u64),
    /// Orders prepared in parallel
    pub capacity: usize,
}

/// Maintenance process settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Mean simulated minutes between breakdowns
    pub mean_uptime: f64,
    /// Mean simulated minutes to repair
    pub mean_repair: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self { mean_uptime: 120.0, mean_repair: 10.0 }
    }
}

/// Control point of the arrival curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Simulated minute of the control point
    pub minute: u64,
    /// Mean arrivals per minute at that point
    pub mean: f64,
}

/// Arrival process settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalConfig {
    /// Maximum visitors admitted during the day
    pub total_visitors: usize,
    /// Piecewise-linear arrival rate curve
    pub curve_points: Vec<CurvePoint>,
    /// Relative weight of each visitor kind
    pub visitor_mix: BTreeMap<VisitorKind, f64>,
    /// Uniform noise added to the mean arrivals per minute
    #[serde(default)]
    pub jitter: f64,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        let mut visitor_mix = BTreeMap::new();
        visitor_mix.insert(VisitorKind::Child, 0.3);
        visitor_mix.insert(VisitorKind::Tourist, 0.5);
        visitor_mix.insert(VisitorKind::AdrenalineAddict, 0.2);

        Self {
            total_visitors: 500,
            curve_points: vec![
                CurvePoint { minute: 0, mean: 2.0 },
                CurvePoint { minute: 120, mean: 6.0 },
                CurvePoint { minute: 360, mean: 4.0 },
                CurvePoint { minute: 600, mean: 0.5 },
            ],
            visitor_mix,
            jitter: 0.0,
        }
    }
}

/// Park-wide policies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether fastpass holders get the priority tier
    pub fastpass: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Clock settings
    pub time: Option<TimeConfig>,
    /// Rides
    pub rides: Option<Vec<RideConfig>>,
    /// Food stands
    pub food: Option<Vec<FoodConfig>>,
    /// Maintenance process
    pub maintenance: Option<MaintenanceConfig>,
    /// Arrival process
    pub arrival: Option<ArrivalConfig>,
    /// Park-wide policies
    pub policy: Option<PolicyConfig>,
    /// Random seed for reproducible results
    pub seed: Option<u64>,
    /// Path of the metrics event log
    pub metrics_output: Option<String>,
    /// Output format for the metrics event log
    pub output_format: Option<String>,
}

/// Configuration for a park simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkConfig {
    /// Clock settings
    pub time: TimeConfig,
    /// Rides
    pub rides: Vec<RideConfig>,
    /// Food stands
    pub food: Vec<FoodConfig>,
    /// Maintenance process
    pub maintenance: MaintenanceConfig,
    /// Arrival process
    pub arrival: ArrivalConfig,
    /// Park-wide policies
    pub policy: PolicyConfig,
    /// Random seed for reproducible results
    pub seed: Option<u64>,
    /// Path of the metrics event log
    pub metrics_output: Option<String>,
    /// Output format for the metrics event log
    pub output_format: String,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for park configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Speed factor is not a positive finite number
    #[error("Speed factor must be a positive number, got {0}")]
    InvalidSpeedFactor(f64),

    /// Opening hours are zero
    #[error("Opening hours must be greater than 0 minutes")]
    InvalidOpenMinutes,

    /// The park has no rides
    #[error("At least one ride must be configured")]
    NoRides,

    /// Two rides share a name
    #[error("Duplicate ride name: {0}")]
    DuplicateRideName(String),

    /// Ride capacity is zero
    #[error("Ride '{0}' must have a capacity greater than 0")]
    InvalidRideCapacity(String),

    /// Ride queue holds no tickets
    #[error("Ride '{0}' must have a queue capacity greater than 0")]
    InvalidQueueCapacity(String),

    /// Two food stands share a name
    #[error("Duplicate food stand name: {0}")]
    DuplicateFoodStandName(String),

    /// Ride run duration is zero
    #[error("Ride '{0}' must run for at least 1 minute")]
    InvalidRunDuration(String),

    /// Food stand capacity is zero
    #[error("Food stand '{0}' must have a capacity greater than 0")]
    InvalidFoodCapacity(String),

    /// Service time range is empty or zero
    #[error("Invalid service time for '{name}': min ({min}) must be >= 1 and <= max ({max})")]
    InvalidServiceTime {
        /// Food stand name
        name: String,
        /// Lower bound
        min: u64,
        /// Upper bound
        max: u64,
    },

    /// A mean duration is not a positive number
    #[error("Invalid mean for {field}: {value} (must be > 0)")]
    InvalidMean {
        /// Name of the field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Percentage value is out of range
    #[error("Invalid value for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidPercentage {
        /// Name of the field with invalid percentage
        field: String,
        /// The invalid percentage value
        value: f64,
    },

    /// Arrival curve has no points or a negative mean
    #[error("Arrival curve must have at least one point with non-negative means")]
    InvalidArrivalCurve,

    /// Visitor mix has no positive weight
    #[error("Visitor mix must contain at least one positive weight")]
    InvalidVisitorMix,

    /// Output format is unknown
    #[error("Unknown output format: {0}")]
    InvalidOutputFormat(String),
}

impl Default for ParkConfig {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            rides: vec![
                RideConfig::new("ThunderCoaster", 16, 5, 3).with_popularity(0.9),
                RideConfig::new("SkyDrop", 8, 3, 2).with_popularity(0.8),
                RideConfig::new("Carousel", 20, 4, 3).with_popularity(0.6),
                RideConfig::new("HauntedMansion", 10, 6, 3).with_popularity(0.7),
                RideConfig::new("FerrisWheel", 20, 7, 4).with_popularity(0.6),
            ],
            food: vec![
                FoodConfig { name: "BurgerTruck".to_string(), service_time: (3, 6), capacity: 10 },
                FoodConfig { name: "IceCreamStand".to_string(), service_time: (2, 5), capacity: 8 },
            ],
            maintenance: MaintenanceConfig::default(),
            arrival: ArrivalConfig::default(),
            policy: PolicyConfig { fastpass: true },
            seed: None,
            metrics_output: None,
            output_format: "json".to_string(),
        }
    }
}

impl ParkConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            time: config_file.time.unwrap_or(defaults.time),
            rides: config_file.rides.unwrap_or(defaults.rides),
            food: config_file.food.unwrap_or(defaults.food),
            maintenance: config_file.maintenance.unwrap_or(defaults.maintenance),
            arrival: config_file.arrival.unwrap_or(defaults.arrival),
            policy: config_file.policy.unwrap_or(defaults.policy),
            seed: config_file.seed.or(defaults.seed),
            metrics_output: config_file.metrics_output.or(defaults.metrics_output),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.speed_factor {
            config.time.speed_factor = value;
        }
        if let Some(value) = args.open_minutes {
            config.time.open_minutes = value;
        }
        if let Some(value) = args.total_visitors {
            config.arrival.total_visitors = value;
        }
        if let Some(value) = args.mean_uptime {
            config.maintenance.mean_uptime = value;
        }
        if let Some(value) = args.mean_repair {
            config.maintenance.mean_repair = value;
        }
        if args.fastpass {
            config.policy.fastpass = true;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.metrics_output {
            config.metrics_output = Some(value);
        }
        if let Some(value) = args.output_format {
            config.output_format = value;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let speed = self.time.speed_factor;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigValidationError::InvalidSpeedFactor(speed));
        }
        if self.time.open_minutes == 0 {
            return Err(ConfigValidationError::InvalidOpenMinutes);
        }

        if self.rides.is_empty() {
            return Err(ConfigValidationError::NoRides);
        }
        let mut names = std::collections::HashSet::new();
        for ride in &self.rides {
            if !names.insert(ride.name.as_str()) {
                return Err(ConfigValidationError::DuplicateRideName(ride.name.clone()));
            }
            if ride.capacity == 0 {
                return Err(ConfigValidationError::InvalidRideCapacity(ride.name.clone()));
            }
            if ride.queue_capacity == 0 {
                return Err(ConfigValidationError::InvalidQueueCapacity(ride.name.clone()));
            }
            if ride.run_duration == 0 {
                return Err(ConfigValidationError::InvalidRunDuration(ride.name.clone()));
            }
            self.validate_percentage(&format!("{}.popularity", ride.name), ride.popularity)?;
        }

        let mut stand_names = std::collections::HashSet::new();
        for stand in &self.food {
            if !stand_names.insert(stand.name.as_str()) {
                return Err(ConfigValidationError::DuplicateFoodStandName(stand.name.clone()));
            }
            if stand.capacity == 0 {
                return Err(ConfigValidationError::InvalidFoodCapacity(stand.name.clone()));
            }
            let (min, max) = stand.service_time;
            if min == 0 || min > max {
                return Err(ConfigValidationError::InvalidServiceTime {
                    name: stand.name.clone(),
                    min,
                    max,
                });
            }
        }

        self.validate_mean("maintenance.mean_uptime", self.maintenance.mean_uptime)?;
        self.validate_mean("maintenance.mean_repair", self.maintenance.mean_repair)?;

        if self.arrival.curve_points.is_empty()
            || self.arrival.curve_points.iter().any(|p| !(p.mean >= 0.0))
        {
            return Err(ConfigValidationError::InvalidArrivalCurve);
        }
        if !self.arrival.visitor_mix.values().any(|w| *w > 0.0)
            || self.arrival.visitor_mix.values().any(|w| !(*w >= 0.0))
        {
            return Err(ConfigValidationError::InvalidVisitorMix);
        }

        self.get_output_format().map_err(ConfigValidationError::InvalidOutputFormat)?;

        Ok(())
    }

    fn validate_percentage(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigValidationError::InvalidPercentage {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    fn validate_mean(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigValidationError::InvalidMean { field: field.to_string(), value });
        }
        Ok(())
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }

    /// Look up a ride configuration by name
    pub fn ride(&self, name: &str) -> Option<&RideConfig> {
        self.rides.iter().find(|r| r.name == name)
    }

    /// Total seats across all rides
    pub fn total_ride_capacity(&self) -> usize {
        self.rides.iter().map(|r| r.capacity).sum()
    }
}
