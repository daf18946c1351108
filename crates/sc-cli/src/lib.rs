// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! `sc`: command-line access to the settings tree tooling

pub mod commands;
pub mod config;
pub mod policy_file;

pub use clap::Parser;

use clap::Subcommand;
use commands::{
    ConfigCommands, DecodeArgs, EncodeArgs, EstimateArgs, PullArgs, PushArgs, ShapeArgs,
};
use sc_logging::CliLoggingArgs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sc", version, about = "Settings catalog policy tooling")]
pub struct Cli {
    /// Extra configuration file, above user and environment settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a configuration key, e.g. `--set shape.depth-override=6`
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = config::parse_set)]
    pub sets: Vec<(String, String)>,

    #[command(flatten)]
    pub logging: CliLoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the shape declaration for a depth bound
    Shape(ShapeArgs),
    /// Estimate the nesting depth of configuration files
    Estimate(EstimateArgs),
    /// Encode a policy file into the service wire format
    Encode(EncodeArgs),
    /// Decode a wire-format settings file into a policy
    Decode(DecodeArgs),
    /// Read every setting of a remote policy
    Pull(PullArgs),
    /// Replace the settings of a remote policy
    Push(PushArgs),
    /// Inspect resolved configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}
