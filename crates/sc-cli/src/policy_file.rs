// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Policy and wire files on disk

use anyhow::{Context, Result};
use sc_domain_types::Policy;
use sc_rest_api_contract::{SettingsPage, WireSetting, WireSettingsCollection};
use serde::Deserialize;
use std::path::Path;

/// Policy file contents, kept raw for textual depth estimation
#[derive(Debug)]
pub struct PolicyFile {
    pub raw: String,
    pub policy: Policy,
}

/// Read a policy from JSON, or from TOML when the extension is `.toml`
pub fn read_policy_file(path: &Path) -> Result<PolicyFile> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let policy = parse_policy(&raw, is_toml(path)).with_context(|| format!("parsing {:?}", path))?;
    Ok(PolicyFile { raw, policy })
}

pub fn parse_policy(raw: &str, toml: bool) -> Result<Policy> {
    if toml {
        Ok(toml::from_str(raw)?)
    } else {
        Ok(serde_json::from_str(raw)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Wire settings as submitted (`{"settings": [...]}`) or as read
/// (`{"value": [...]}`)
#[derive(Deserialize)]
#[serde(untagged)]
enum WireDocument {
    Collection(WireSettingsCollection),
    Page(SettingsPage),
}

/// Read wire-format settings from a JSON file
pub fn read_wire_file(path: &Path) -> Result<Vec<WireSetting>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    parse_wire(&raw).with_context(|| format!("parsing {:?}", path))
}

pub fn parse_wire(raw: &str) -> Result<Vec<WireSetting>> {
    let settings = match serde_json::from_str(raw)? {
        WireDocument::Collection(collection) => collection.settings,
        WireDocument::Page(page) => page.items,
    };
    Ok(settings)
}
