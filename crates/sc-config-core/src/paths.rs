// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration file locations

use std::path::PathBuf;

const APP_DIR: &str = "settings-catalog";
const FILE_NAME: &str = "config.toml";

/// Configuration files, one per file-backed scope
#[derive(Debug, Clone)]
pub struct Paths {
    pub system: PathBuf,
    pub user: PathBuf,
    /// File passed with `--config`
    pub cli_config: Option<PathBuf>,
}

/// Standard locations for the current environment
pub fn discover_paths(cli_config: Option<PathBuf>) -> Paths {
    Paths {
        system: system_config_path(),
        user: user_config_path(),
        cli_config,
    }
}

fn system_config_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support").join(APP_DIR).join(FILE_NAME)
    } else if cfg!(target_os = "windows") {
        PathBuf::from(std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".into()))
            .join(APP_DIR)
            .join(FILE_NAME)
    } else {
        PathBuf::from("/etc").join(APP_DIR).join(FILE_NAME)
    }
}

/// `$SC_HOME/config.toml`, else `$XDG_CONFIG_HOME`, else `~/.config`
fn user_config_path() -> PathBuf {
    if let Some(home) = std::env::var_os("SC_HOME") {
        return PathBuf::from(home).join(FILE_NAME);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_DIR).join(FILE_NAME);
    }
    PathBuf::from(std::env::var_os("HOME").unwrap_or_else(|| "/tmp".into()))
        .join(".config")
        .join(APP_DIR)
        .join(FILE_NAME)
}
