//! Command-line argument parsing for `nebula-plop`.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::error::RuleError;

/// Force a content name into a world, bypassing worldgen gating.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "nebula-plop", about = "Force generated content into a world")]
pub struct CliArgs {
    /// Content name, e.g. `oak_bees` or `nebula:bastion_remnant`.
    pub name: String,

    /// Block X coordinate.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub x: i32,

    /// Block Y coordinate.
    #[arg(long, default_value_t = 64, allow_hyphen_values = true)]
    pub y: i32,

    /// Block Z coordinate.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub z: i32,

    /// Align structures to their spacing grid.
    #[arg(long)]
    pub grid: bool,

    /// Only check whether the structure would start here.
    #[arg(long)]
    pub probe: bool,

    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Permission level of the caller (0-4).
    #[arg(long, default_value_t = 4)]
    pub level: u8,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rule assignment `key=value`; may be repeated.
    #[arg(long = "rule", value_name = "KEY=VALUE")]
    pub rules: Vec<String>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// Stops at the first rule assignment that is malformed or rejected.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), RuleError> {
        if let Some(seed) = args.seed {
            self.placement.world_seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        for assignment in &args.rules {
            let (name, value) = assignment
                .split_once('=')
                .ok_or_else(|| RuleError::MalformedAssignment(assignment.clone()))?;
            self.rules.set(name.trim(), value)?;
        }
        Ok(())
    }
}
