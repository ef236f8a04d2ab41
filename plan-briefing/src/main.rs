use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use mission_planner_model::calc;
use mission_planner_model::codec;

#[derive(Parser)]
struct Args {
    /// Path to an exported plan.json to brief
    #[arg(long)]
    input: String,

    /// Only brief the flight with this name
    #[arg(long)]
    flight: Option<String>,
}

fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Info).unwrap();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("couldn't read {}", args.input))?;
    let doc = codec::from_json(&raw)?;
    let (mission, config) = codec::deserialize(&doc)?;
    info!(
        "{}: {} flights, {} markers",
        config.full_name,
        mission.routes().len(),
        mission.markers().len()
    );

    for route in mission.routes() {
        if let Some(only) = &args.flight {
            if &route.name != only {
                continue;
            }
        }
        println!("{} ({} km/h)", route.name, route.base_speed);
        let mut total_km = 0.0;
        let mut total_seconds = 0.0;
        for leg in route.legs(config) {
            println!("  {}", leg.label);
            total_km += leg.distance;
            total_seconds += leg.eta_seconds;
        }
        println!(
            "  total {:.1} km in {}",
            total_km,
            calc::format_time(total_seconds)
        );
    }

    for marker in mission.markers() {
        let kind = serde_json::to_value(marker.kind)?;
        println!(
            "* {} [{}] at {:.0}/{:.0} {}",
            marker.name,
            kind.as_str().unwrap_or("marker"),
            marker.position.lat,
            marker.position.lng,
            marker.notes
        );
    }
    Ok(())
}
