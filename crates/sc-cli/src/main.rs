// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use sc_cli::{Cli, Commands, Parser};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = sc_cli::config::load(cli.config.as_deref(), &cli.sets)?;
    let default_level = sc_cli::config::default_log_level(&resolved);
    cli.logging.init("sc", default_level)?;

    match cli.command {
        Commands::Shape(args) => args.run(&resolved),
        Commands::Estimate(args) => args.run(&resolved),
        Commands::Encode(args) => args.run(&resolved),
        Commands::Decode(args) => args.run(),
        Commands::Pull(args) => args.run(&resolved).await,
        Commands::Push(args) => args.run(&resolved).await,
        Commands::Config { subcommand } => subcommand.run(&resolved),
    }
}
