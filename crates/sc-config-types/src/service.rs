// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Remote service and general settings

use serde::{Deserialize, Serialize};

/// Root-level keys, flattened into the main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceRoot {
    /// Base URL of the management service, e.g. `https://graph.microsoft.com`
    pub service_base_url: Option<String>,
    /// Service API version used in request paths
    pub api_version: Option<ApiVersion>,
    /// Default log level for the CLI
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, schemars::JsonSchema, PartialEq, Eq)]
pub enum ApiVersion {
    #[serde(rename = "v1.0")]
    V1,
    #[default]
    #[serde(rename = "beta")]
    Beta,
}

impl ApiVersion {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1.0",
            ApiVersion::Beta => "beta",
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
