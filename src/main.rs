//! Speed Limit Advisor - one-shot command
//!
//! Reads one set of sensor readings from the command line and prints the
//! recommended limit with its justification.

use anyhow::Context;
use chrono::Timelike;
use clap::Parser;

use speedlimit_core::constants::{APP_NAME, APP_VERSION};
use speedlimit_core::{EngineConfig, FusionEngine, SensorSnapshot};

#[derive(Debug, Parser)]
#[command(name = "speedlimit", version, about = "Recommend a speed limit from sensor readings")]
struct Args {
    /// Ambient light (millilux)
    #[arg(long, allow_negative_numbers = true)]
    illuminance: f64,

    /// Water film on the road (micrometers)
    #[arg(long, allow_negative_numbers = true)]
    water_level: f64,

    /// Air temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    temperature: f64,

    /// Hour of day for the air-quality estimate (default: current local hour)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..24))]
    hour: Option<u8>,

    /// Print the full decision trace as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = EngineConfig::from_env();
    let engine = FusionEngine::from_config(&config);

    let status = engine.predictor_status();
    if status.model_loaded {
        log::info!("Near-accident model loaded: {}", status.model_name);
    } else {
        log::info!("Near-accident model not found - using fallback heuristics");
    }

    let hour = args.hour.unwrap_or_else(|| chrono::Local::now().hour() as u8);
    let snapshot = SensorSnapshot::new(args.illuminance, args.water_level, args.temperature, hour);

    let (decision, trace) = engine.decide_traced(snapshot);

    if args.json {
        let json = serde_json::to_string_pretty(&trace).context("failed to serialize decision trace")?;
        println!("{}", json);
    } else {
        println!("Recommended Speed Limit: {} km/h", decision.speed_limit_kmh);
        println!("Justification: {}", decision.justification);
    }

    Ok(())
}
