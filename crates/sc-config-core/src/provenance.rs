// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Which layer set each configuration value

use serde_json::Value as J;
use std::collections::BTreeMap;

/// Configuration layers, lowest precedence first
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Scope {
    System,
    User,
    Env,
    CliConfig,
    Flags,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scope::System => "system",
            Scope::User => "user",
            Scope::Env => "env",
            Scope::CliConfig => "cli-config",
            Scope::Flags => "flags",
        };
        f.write_str(name)
    }
}

#[derive(Default, Clone, Debug)]
pub struct Provenance {
    /// Dotted key path to the scope whose value won
    pub winner: BTreeMap<String, Scope>,
    /// Dotted key path to every value it was given, in layer order
    pub changes: BTreeMap<String, Vec<(Scope, J)>>,
}

impl Provenance {
    /// Record every leaf of `layer` as set by `scope`.
    ///
    /// Arrays are leaves; `null` leaves the lower layer in place and is not
    /// recorded.
    pub fn record_layer(&mut self, layer: &J, scope: Scope) {
        self.record_at(layer, scope, "");
    }

    fn record_at(&mut self, value: &J, scope: Scope, prefix: &str) {
        match value {
            J::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    self.record_at(child, scope, &path);
                }
            }
            J::Null => {}
            _ => {
                self.winner.insert(prefix.to_string(), scope);
                self.changes.entry(prefix.to_string()).or_default().push((scope, value.clone()));
            }
        }
    }
}
