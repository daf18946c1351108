// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered configuration for the settings catalog tools.
//!
//! Layers are loaded from TOML files, `SC_*` environment variables and
//! `--set key=value` flags, validated against the schema generated from
//! `sc-config-types`, merged as JSON and tracked for provenance.

pub mod env;
pub mod extract;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod provenance;
pub mod schema;

pub use provenance::{Provenance, Scope};
pub use schema::SchemaRoot;

use anyhow::Result;
use sc_config_types::service::ServiceRoot;
use sc_config_types::shape::{PagingSection, ShapeSection};
use serde_json::Value as J;
use std::path::Path;

/// Merged configuration and where each value came from
#[derive(Debug)]
pub struct Resolved {
    pub json: J,
    pub provenance: Provenance,
}

impl Resolved {
    pub fn service(&self) -> Result<ServiceRoot> {
        extract::get(&self.json)
    }

    pub fn shape(&self) -> Result<ShapeSection> {
        Ok(extract::get_at(&self.json, "shape")?.unwrap_or_default())
    }

    pub fn paging(&self) -> Result<PagingSection> {
        Ok(extract::get_at(&self.json, "paging")?.unwrap_or_default())
    }
}

/// Load and merge every layer.
///
/// Precedence: system < user < env < cli-config < flags. Missing files are
/// skipped; a file that fails to parse or validate is an error.
pub fn load_all(paths: &paths::Paths, flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    use Scope::*;

    let system_layer = read_optional(&paths.system, System)?;
    let user_layer = read_optional(&paths.user, User)?;
    let env_layer = env::env_overlay()?;
    let cli_config_layer = match &paths.cli_config {
        // An explicit file must exist
        Some(p) => Some(loader::read_layer_from_file(p, CliConfig)?),
        None => None,
    };
    let flags_layer = env::flags_overlay(flag_sets);
    loader::validate_against_schema(&flags_layer)
        .map_err(|e| anyhow::anyhow!("invalid --set value: {e}"))?;

    let layers = [
        (system_layer.map(|l| l.json), System),
        (user_layer.map(|l| l.json), User),
        (Some(env_layer), Env),
        (cli_config_layer.map(|l| l.json), CliConfig),
        (Some(flags_layer), Flags),
    ];

    let mut provenance = Provenance::default();
    let mut json = serde_json::json!({});
    for (layer, scope) in layers {
        let Some(layer) = layer else { continue };
        provenance.record_layer(&layer, scope);
        merge::merge_two_json(&mut json, layer);
    }

    Ok(Resolved { json, provenance })
}

fn read_optional(path: &Path, scope: Scope) -> Result<Option<loader::Layer>> {
    if path.exists() {
        loader::read_layer_from_file(path, scope).map(Some)
    } else {
        Ok(None)
    }
}
