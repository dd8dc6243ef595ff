//! Configuration for the placement tools.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! a validated rule store, and CLI overrides via clap.

mod cli;
mod config;
mod error;
mod rules;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, PlacementConfig};
pub use error::{ConfigError, RuleError};
pub use rules::{RULES, RuleConfig, Validator};
