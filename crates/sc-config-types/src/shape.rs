// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Depth bound and paging sections

use serde::{Deserialize, Serialize};

/// `[shape]`: how deep the generated settings shape goes
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ShapeSection {
    /// Operator override for the depth bound; wins over every other source
    #[schemars(range(min = 1, max = 15))]
    pub depth_override: Option<u8>,
    /// Constrained execution (CI, tests): use `constrained-depth`
    pub constrained: Option<bool>,
    /// Bound used when constrained
    #[schemars(range(min = 1, max = 15))]
    pub constrained_depth: Option<u8>,
}

/// `[paging]`: settings collection reads
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PagingSection {
    /// Items requested per page
    #[schemars(range(min = 1, max = 1000))]
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_section_from_toml() {
        let section: ShapeSection = toml::from_str(
            r#"
            depth-override = 9
            constrained = true
            "#,
        )
        .unwrap();
        assert_eq!(section.depth_override, Some(9));
        assert_eq!(section.constrained, Some(true));
        assert_eq!(section.constrained_depth, None);
    }

    #[test]
    fn test_schema_carries_range() {
        let schema = serde_json::to_value(schemars::schema_for!(ShapeSection)).unwrap();
        let depth = &schema["properties"]["depth-override"];
        assert_eq!(depth["minimum"], 1.0);
        assert_eq!(depth["maximum"], 15.0);
    }
}
