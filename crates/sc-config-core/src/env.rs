// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Environment and command-line flag overlays

use anyhow::Result;
use serde_json::Value as J;

/// `SC_*` variables read directly by the tools rather than through the layers
const NON_CONFIG_VARS: &[&str] = &["home", "access_token"];

/// Overlay built from `SC_*` variables.
///
/// Sections are separated by a double underscore and single underscores
/// become dashes: `SC_SHAPE__DEPTH_OVERRIDE=9` sets `shape.depth-override`.
/// Numbers and booleans are parsed.
pub fn env_overlay() -> Result<J> {
    let built = config::Config::builder()
        .add_source(
            config::Environment::with_prefix("SC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut map = built.try_deserialize::<serde_json::Map<String, J>>()?;
    for key in NON_CONFIG_VARS {
        map.remove(*key);
    }
    Ok(crate::merge::kebab_keys(J::Object(map)))
}

/// Overlay built from `key=value` flag pairs
pub fn flags_overlay(kv_pairs: &[(&str, &str)]) -> J {
    let mut root = serde_json::json!({});
    for (k, v) in kv_pairs {
        crate::merge::insert_dotted(&mut root, k, parse_flag_value(v));
    }
    root
}

/// Numbers and booleans as such, everything else as a string
fn parse_flag_value(raw: &str) -> J {
    match serde_json::from_str::<J>(raw) {
        Ok(v @ (J::Bool(_) | J::Number(_))) => v,
        _ => J::String(raw.to_string()),
    }
}
