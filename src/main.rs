// Theme Park Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/theme-park-sim --seed 42
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/theme-park-sim --config park.json --speed-factor 1200 --metrics-output events.csv --output-format csv
// ```

use anyhow::Context;
use clap::Parser;
use std::process;
use theme_park_sim::simulation::{LoggingConfig, ParkSimulation, SimulationReport};
use theme_park_sim::types::{CliArgs, ParkConfig};
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match ParkConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Keep the guard alive so the file writer flushes on exit
    let logging = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::init_quiet()
    };
    let _guard = match logging {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Theme Park Simulator");

    if let Err(e) = run(args) {
        error!("Simulation failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("Theme Park Simulator completed successfully");
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    let dry_run = args.dry_run;
    let config = ParkConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return Ok(());
    }

    print_startup_banner(&config);

    let simulation = ParkSimulation::new(config).context("Failed to initialize simulation")?;
    let report = simulation.run().context("Simulation run failed")?;
    print_final_report(&report);

    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &ParkConfig) {
    eprintln!("Theme Park Simulator");
    eprintln!("====================");
    eprintln!("A concurrent amusement park simulation");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &ParkConfig) {
    eprintln!("Configuration:");
    eprintln!("  Open Minutes: {}", config.time.open_minutes);
    eprintln!("  Speed Factor: {} simulated min/s", config.time.speed_factor);
    eprintln!("  Total Visitors: {}", config.arrival.total_visitors);
    eprintln!("  Fastpass: {}", if config.policy.fastpass { "enabled" } else { "disabled" });
    eprintln!(
        "  Maintenance: mean uptime {} min, mean repair {} min",
        config.maintenance.mean_uptime, config.maintenance.mean_repair
    );
    eprintln!("  Rides:");
    for ride in &config.rides {
        eprintln!(
            "    {} (capacity {}, run {} min, boarding {} min, popularity {:.1})",
            ride.name, ride.capacity, ride.run_duration, ride.board_window, ride.popularity
        );
    }
    eprintln!("  Food Stands:");
    for stand in &config.food {
        eprintln!(
            "    {} (capacity {}, service {}-{} min)",
            stand.name, stand.capacity, stand.service_time.0, stand.service_time.1
        );
    }
    match &config.metrics_output {
        Some(path) => eprintln!("  Metrics Output: {} ({})", path, config.output_format),
        None => eprintln!("  Metrics Output: in memory"),
    }
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!("  Estimated Seats per Cycle: {}", config.total_ride_capacity());
    eprintln!();
}

fn print_final_report(report: &SimulationReport) {
    eprintln!("{}", report);
}
