// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Policy: the ordered list of root settings

use serde::{Deserialize, Serialize};

use crate::node::SettingNode;

/// A root setting together with its service-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySetting {
    /// Assigned by the service; absent on settings that were never stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub node: SettingNode,
}

impl PolicySetting {
    pub fn new(node: SettingNode) -> Self {
        Self { id: None, node }
    }

    pub fn with_id(id: impl Into<String>, node: SettingNode) -> Self {
        Self {
            id: Some(id.into()),
            node,
        }
    }
}

impl From<SettingNode> for PolicySetting {
    fn from(node: SettingNode) -> Self {
        Self::new(node)
    }
}

/// The settings tree of one policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub settings: Vec<PolicySetting>,
}

impl Policy {
    pub fn new(settings: Vec<PolicySetting>) -> Self {
        Self { settings }
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Deepest nesting across all root settings; 0 for an empty policy
    pub fn max_depth(&self) -> usize {
        self.settings.iter().map(|s| s.node.depth()).max().unwrap_or(0)
    }

    /// Total number of nodes across all root settings
    pub fn node_count(&self) -> usize {
        self.settings.iter().map(|s| s.node.node_count()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicySetting> {
        self.settings.iter()
    }
}

impl FromIterator<PolicySetting> for Policy {
    fn from_iter<I: IntoIterator<Item = PolicySetting>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
