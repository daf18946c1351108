// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Canonical shape of the whole configuration, used for schema generation
//! and file validation only. Code reads configuration through the typed
//! sections in `sc-config-types`.

use schemars::JsonSchema;
use sc_config_types::service::ServiceRoot;
use sc_config_types::shape::{PagingSection, ShapeSection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SchemaRoot {
    #[serde(flatten)]
    pub service: ServiceRoot,

    pub shape: Option<ShapeSection>,

    pub paging: Option<PagingSection>,
}
