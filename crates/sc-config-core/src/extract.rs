// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed extraction from the merged configuration

use serde::de::DeserializeOwned;
use serde_json::Value as J;

/// Extract the whole root as a typed value
pub fn get<T: DeserializeOwned>(root: &J) -> anyhow::Result<T> {
    serde_path_to_error::deserialize(root.clone())
        .map_err(|e| anyhow::anyhow!("Root extraction failed: {}", e))
}

/// Extract the section at a dotted path; a missing section is `None`
pub fn get_at<T: DeserializeOwned>(root: &J, dotted: &str) -> anyhow::Result<Option<T>> {
    let mut cur = root;
    for p in dotted.split('.') {
        match cur.get(p) {
            Some(next) => cur = next,
            None => return Ok(None),
        }
    }
    serde_path_to_error::deserialize(cur.clone())
        .map(Some)
        .map_err(|e| anyhow::anyhow!("Path '{}' extraction failed: {}", dotted, e))
}
