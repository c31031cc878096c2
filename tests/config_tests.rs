//! Tests for CLI parsing, config files and validation

use clap::Parser;
use std::io::Write;
use theme_park_sim::types::{CliArgs, ConfigError, ConfigValidationError, FoodConfig, ParkConfig, RideConfig};
use theme_park_sim::*;

#[test]
fn test_cli_overrides() {
    let args = CliArgs::try_parse_from([
        "theme-park-sim",
        "--speed-factor",
        "120",
        "--open-minutes",
        "300",
        "--total-visitors",
        "50",
        "--mean-uptime",
        "90",
        "--seed",
        "11",
        "--output-format",
        "csv",
    ])
    .unwrap();
    let config = ParkConfig::from_cli_args(args).unwrap();

    assert_eq!(config.time.speed_factor, 120.0);
    assert_eq!(config.time.open_minutes, 300);
    assert_eq!(config.arrival.total_visitors, 50);
    assert_eq!(config.maintenance.mean_uptime, 90.0);
    assert_eq!(config.seed, Some(11));
    assert_eq!(config.get_output_format().unwrap(), OutputFormat::Csv);
}

#[test]
fn test_file_then_cli_precedence() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "time": {{ "speed_factor": 30.0, "open_minutes": 120 }},
            "rides": [{{ "name": "Wave", "capacity": 6, "run_duration": 2, "board_window": 1 }}],
            "seed": 4
        }}"#
    )
    .unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let args = CliArgs::try_parse_from(["theme-park-sim", "--config", &path, "--open-minutes", "240"]).unwrap();
    let config = ParkConfig::from_cli_args(args).unwrap();

    assert_eq!(config.time.speed_factor, 30.0);
    assert_eq!(config.time.open_minutes, 240);
    assert_eq!(config.rides.len(), 1);
    assert_eq!(config.ride("Wave").unwrap().queue_capacity, 100);
    assert_eq!(config.seed, Some(4));
    // Sections missing from the file fall back to defaults
    assert_eq!(config.food.len(), 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_and_unsupported_files() {
    assert!(matches!(ParkConfig::from_file("/no/such/park.json"), Err(ConfigError::FileNotFound(_))));

    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    assert!(matches!(ParkConfig::from_file(file.path()), Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_save_and_reload() {
    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let mut config = ParkConfig::default();
    config.seed = Some(99);
    config.save_to_file(file.path()).unwrap();

    let loaded = ParkConfig::from_file(file.path()).unwrap();
    assert_eq!(loaded.seed, Some(99));
    assert_eq!(loaded.rides, config.rides);
}

#[test]
fn test_validation_failures() {
    let mut config = ParkConfig::default();
    config.rides.push(RideConfig::new("Carousel", 4, 3, 1));
    assert!(matches!(config.validate(), Err(ConfigValidationError::DuplicateRideName(name)) if name == "Carousel"));

    let mut config = ParkConfig::default();
    config.time.speed_factor = 0.0;
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidSpeedFactor(_))));

    let mut config = ParkConfig::default();
    config.rides.clear();
    assert!(matches!(config.validate(), Err(ConfigValidationError::NoRides)));

    let mut config = ParkConfig::default();
    config.food.push(FoodConfig { name: "Pretzels".to_string(), service_time: (5, 2), capacity: 3 });
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidServiceTime { .. })));

    let mut config = ParkConfig::default();
    config.maintenance.mean_repair = -1.0;
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidMean { .. })));

    let mut config = ParkConfig::default();
    config.arrival.curve_points.clear();
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidArrivalCurve)));

    let mut config = ParkConfig::default();
    config.output_format = "xml".to_string();
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidOutputFormat(_))));
}

/// A ride whose queue holds nothing would turn every visitor away
#[test]
fn test_zero_queue_capacity_rejected() {
    let mut config = ParkConfig::default();
    config.rides.push(RideConfig::new("Closed", 4, 3, 1).with_queue_capacity(0));
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::InvalidQueueCapacity(name)) if name == "Closed"
    ));
    assert!(ParkSimulation::new(config).is_err());
}

#[test]
fn test_duplicate_food_stand_rejected() {
    let mut config = ParkConfig::default();
    config.food.push(FoodConfig { name: "BurgerTruck".to_string(), service_time: (1, 2), capacity: 2 });
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::DuplicateFoodStandName(name)) if name == "BurgerTruck"
    ));
}
