// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! TOML loading and schema validation

use anyhow::{Context, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value as J;
use std::path::Path;
use std::sync::OnceLock;

/// Parse TOML text into JSON for validation and merging
pub fn parse_toml_to_json(toml_str: &str) -> Result<J> {
    let toml: toml::Value = toml_str.parse::<toml::Value>()?;
    Ok(serde_json::to_value(toml)?)
}

/// JSON schema of the whole configuration.
///
/// schemars drops `deny_unknown_fields` once a field is flattened, so the
/// root is closed here.
pub fn config_schema() -> &'static J {
    static SCHEMA: OnceLock<J> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let rs = schemars::schema_for!(crate::schema::SchemaRoot);
        let mut schema = serde_json::to_value(rs).unwrap_or(J::Bool(true));
        if let Some(root) = schema.as_object_mut() {
            root.insert("additionalProperties".to_string(), J::Bool(false));
        }
        schema
    })
}

fn validator() -> Result<&'static JSONSchema> {
    static VALIDATOR: OnceLock<JSONSchema> = OnceLock::new();
    if let Some(v) = VALIDATOR.get() {
        return Ok(v);
    }
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(config_schema())
        .map_err(|e| anyhow::anyhow!("Config schema compilation failed: {e}"))?;
    Ok(VALIDATOR.get_or_init(|| compiled))
}

/// Validate a configuration layer against the schema
pub fn validate_against_schema(v: &J) -> Result<()> {
    let validation_result = validator()?.validate(v);
    if let Err(errors) = validation_result {
        let error_msg = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("\n  - ");
        anyhow::bail!("Config schema validation failed:\n  - {}", error_msg);
    }
    Ok(())
}

/// A loaded configuration layer
#[derive(Debug, Clone)]
pub struct Layer {
    pub scope: crate::Scope,
    pub json: J,
}

/// Load and validate a layer from a TOML file
pub fn read_layer_from_file(path: &Path, scope: crate::Scope) -> Result<Layer> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading config file {:?}", path))?;

    let json = parse_toml_to_json(&content).with_context(|| format!("parsing {:?}", path))?;
    validate_against_schema(&json).with_context(|| format!("validating {:?}", path))?;

    Ok(Layer { scope, json })
}
