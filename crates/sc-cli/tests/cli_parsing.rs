// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use sc_cli::commands::ConfigCommands;
use sc_cli::{Cli, Commands, Parser};
use sc_logging::CliLogLevel;

#[test]
fn shape_with_depth_and_json() {
    let cli = Cli::try_parse_from(["sc", "shape", "--depth", "6", "--json"]).unwrap();
    match cli.command {
        Commands::Shape(args) => {
            assert_eq!(args.depth, Some(6));
            assert!(args.json);
            assert!(args.from.is_empty());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn estimate_requires_a_file() {
    assert!(Cli::try_parse_from(["sc", "estimate"]).is_err());
    let cli = Cli::try_parse_from(["sc", "estimate", "a.tf", "b.json"]).unwrap();
    assert!(matches!(cli.command, Commands::Estimate(ref args) if args.files.len() == 2));
}

#[test]
fn global_flags_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "sc",
        "push",
        "policy-1",
        "policy.json",
        "--set",
        "shape.constrained=true",
        "--set",
        "paging.page-size=10",
        "--log-level",
        "debug",
        "--config",
        "/tmp/sc.toml",
    ])
    .unwrap();

    assert_eq!(
        cli.sets,
        vec![
            ("shape.constrained".to_string(), "true".to_string()),
            ("paging.page-size".to_string(), "10".to_string()),
        ]
    );
    assert_eq!(cli.logging.log_level, Some(CliLogLevel::Debug));
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/sc.toml")));
    match cli.command {
        Commands::Push(args) => {
            assert_eq!(args.policy_id, "policy-1");
            assert_eq!(args.file, std::path::PathBuf::from("policy.json"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn malformed_set_is_rejected() {
    assert!(Cli::try_parse_from(["sc", "config", "show", "--set", "novalue"]).is_err());
}

#[test]
fn config_show_with_origin() {
    let cli = Cli::try_parse_from(["sc", "config", "show", "shape.constrained", "--show-origin"])
        .unwrap();
    match cli.command {
        Commands::Config {
            subcommand: ConfigCommands::Show { key, show_origin },
        } => {
            assert_eq!(key.as_deref(), Some("shape.constrained"));
            assert!(show_origin);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn pull_options() {
    let cli = Cli::try_parse_from(["sc", "pull", "p", "-o", "out.json", "--allow-partial"]).unwrap();
    match cli.command {
        Commands::Pull(args) => {
            assert_eq!(args.policy_id, "p");
            assert!(args.allow_partial);
            assert_eq!(args.output, Some(std::path::PathBuf::from("out.json")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
