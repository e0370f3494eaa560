//! Fuzzy Racer entry point
//!
//! Headless run: `fuzzy-racer [settings.json] [--vehicle car|spaceship]`. Set
//! `RUST_LOG=debug` for per-tick detail.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fuzzy_racer::sensor::{FieldBounds, SensorArray};
use fuzzy_racer::settings::{Settings, VehicleKind};
use fuzzy_racer::sim::{
    DuelState, FuzzyCarController, FuzzyShipController, OccupancyGrid, RaceState, tick, tick_duel,
};

#[derive(Parser, Debug)]
#[command(name = "fuzzy-racer")]
#[command(about = "Headless fuzzy-logic autopilot runs for a car or a spaceship")]
struct Args {
    /// Settings JSON; a missing file means defaults
    settings: Option<PathBuf>,
    /// Vehicle to run, overriding the settings file
    #[arg(long, value_enum)]
    vehicle: Option<VehicleKind>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::init();
    log::info!("Fuzzy Racer (headless) starting...");

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(kind) = args.vehicle {
        settings.vehicle = kind;
    }
    log::info!("Running {} for {} ticks", settings.vehicle.as_str(), settings.ticks);

    match settings.vehicle {
        VehicleKind::Car => run_race(&settings),
        VehicleKind::Spaceship => run_duel(&settings),
    }
}

fn run_race(settings: &Settings) -> anyhow::Result<()> {
    let grid = OccupancyGrid::ring(
        settings.field_width,
        settings.field_height,
        settings.lane_width,
        settings.seed,
    );
    let sensors = SensorArray::new(settings.sensor_angles);
    let mut controller = FuzzyCarController::new(settings.inference_options())?;
    let mut state = RaceState::on_track(&grid);

    for _ in 0..settings.ticks {
        tick(&mut state, &mut controller, &grid, &sensors, settings)?;
        if settings.log_every > 0 && state.tick_count % settings.log_every == 0 {
            let v = &state.vehicle;
            log::info!(
                "tick {:>6}  pos ({:>6.1}, {:>6.1})  v {:>6.1}  gas {:.2} brake {:.2} steer {:+.2}",
                state.tick_count,
                v.position.x,
                v.position.y,
                v.velocity,
                state.controls.gas,
                state.controls.brake,
                state.controls.steer
            );
        }
    }
    log::debug!("Final state:\n{}", controller.describe());

    println!(
        "car: {} ticks, {:.1} units driven, {} ticks off track",
        state.tick_count, state.distance, state.off_track_ticks
    );
    Ok(())
}

fn run_duel(settings: &Settings) -> anyhow::Result<()> {
    let screen = FieldBounds::new(settings.field_width as f64, settings.field_height as f64);
    let sensors = SensorArray::new(settings.sensor_angles);
    let mut controller =
        FuzzyShipController::new(settings.inference_options(), settings.fire_distance)?;
    let mut state = DuelState::new(screen);

    for _ in 0..settings.ticks {
        tick_duel(&mut state, &mut controller, &sensors, settings)?;
        if settings.log_every > 0 && state.tick_count % settings.log_every == 0 {
            log::info!(
                "tick {:>6}  ship ({:>6.1}, {:>6.1})  enemy head {:?}  volleys {}",
                state.tick_count,
                state.ship.position.x,
                state.ship.position.y,
                state.enemy_rays.head(),
                state.volleys_fired
            );
        }
    }
    log::debug!("Final state:\n{}", controller.describe());

    println!(
        "spaceship: {} ticks, {} volleys fired, {} boundary hits",
        state.tick_count, state.volleys_fired, state.boundary_hits
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_args_settings_and_vehicle() {
        let args = Args::try_parse_from(["fuzzy-racer", "race.json", "--vehicle", "ship"]).unwrap();
        assert_eq!(args.settings, Some(PathBuf::from("race.json")));
        assert_eq!(args.vehicle, Some(VehicleKind::Spaceship));

        let args = Args::try_parse_from(["fuzzy-racer"]).unwrap();
        assert_eq!(args.settings, None);
        assert_eq!(args.vehicle, None);
    }

    #[test]
    fn test_help_is_not_a_settings_path() {
        let err = Args::try_parse_from(["fuzzy-racer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_unknown_vehicle_rejected() {
        let err = Args::try_parse_from(["fuzzy-racer", "--vehicle", "boat"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
