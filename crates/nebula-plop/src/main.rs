//! Operator tool: resolve a content name and force it into an in-memory world.
//!
//! Run with: `cargo run -p nebula-plop -- oak_bees --x 10 --z -4`

use std::process::ExitCode;

use clap::Parser;
use glam::IVec3;
use nebula_config::{CliArgs, Config};
use nebula_placement::{MemoryWorld, PlacementEngine};
use tracing::{info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(Config::default_dir);
    let mut config = match &config_dir {
        Some(dir) => match Config::load_or_create(dir) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("nebula-plop: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Err(e) = config.apply_cli_overrides(&args) {
        eprintln!("nebula-plop: {e}");
        return ExitCode::FAILURE;
    }

    nebula_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    if !config.rules.allows_plop(args.level) {
        warn!(
            level = args.level,
            required = %config.rules.command_plop,
            "permission denied"
        );
        println!("permission denied: plop requires level {}", config.rules.command_plop);
        return ExitCode::FAILURE;
    }

    let world = MemoryWorld::builtin(config.placement.world_seed);
    world.set_poi_updates(config.rules.poi_updates);
    let engine = PlacementEngine::from_config(&config);
    let position = IVec3::new(args.x, args.y, args.z);
    info!(name = %args.name, ?position, seed = config.placement.world_seed, "plop");

    let placed = if args.probe {
        probe(&engine, &world, &args.name, position)
    } else if args.grid {
        engine
            .resolve_configured_structure(&args.name, &world, position)
            .and_then(|structure| engine.place_on_grid(&structure, &world, position))
    } else {
        engine.resolve_and_place(&args.name, &world, position)
    };

    match placed {
        None if args.probe => println!("{}: does not start here", args.name),
        None => println!("{}: nothing to place", args.name),
        Some(false) => println!("{}: generation failed", args.name),
        Some(true) => println!(
            "{}: placed, {} blocks changed, {} structure starts recorded",
            args.name,
            world.changed_blocks(),
            world.structure_store().starts().len()
        ),
    }
    if placed == Some(true) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Reports whether the named structure would start at `position`.
fn probe(
    engine: &PlacementEngine,
    world: &MemoryWorld,
    name: &str,
    position: IVec3,
) -> Option<bool> {
    let start = engine.probe_start(name, world, position)?;
    let bounds = start.bounding_box();
    println!(
        "{name}: starts in chunk ({}, {}) with {} pieces, bounds {bounds:?}",
        start.chunk.x,
        start.chunk.z,
        start.pieces().len()
    );
    Some(true)
}
