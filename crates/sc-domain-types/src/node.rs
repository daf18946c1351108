// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The recursive setting node

use serde::{Deserialize, Serialize};

use crate::value::{ChoiceValue, GroupValue, InstanceTemplateReference, SimpleValue};

/// One node of a settings tree.
///
/// The fields shared by every kind live here; the kind-specific payload is
/// flattened in from [`SettingKind`], so a node is authored as
/// `{ "definition_id": ..., "choice": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingNode {
    /// Identifier of the setting definition this node instantiates
    pub definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_template_reference: Option<InstanceTemplateReference>,
    #[serde(flatten)]
    pub kind: SettingKind,
}

/// Closed set of node kinds with their payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Simple(SimpleValue),
    SimpleCollection(Vec<SimpleValue>),
    Choice(ChoiceValue),
    ChoiceCollection(Vec<ChoiceValue>),
    GroupCollection(Vec<GroupValue>),
}

impl SettingKind {
    /// Stable kind name, matching the serialized key
    pub const fn name(&self) -> &'static str {
        match self {
            SettingKind::Simple(_) => "simple",
            SettingKind::SimpleCollection(_) => "simple_collection",
            SettingKind::Choice(_) => "choice",
            SettingKind::ChoiceCollection(_) => "choice_collection",
            SettingKind::GroupCollection(_) => "group_collection",
        }
    }
}

impl SettingNode {
    pub fn new(definition_id: impl Into<String>, kind: SettingKind) -> Self {
        Self {
            definition_id: definition_id.into(),
            instance_template_reference: None,
            kind,
        }
    }

    pub fn simple(definition_id: impl Into<String>, value: SimpleValue) -> Self {
        Self::new(definition_id, SettingKind::Simple(value))
    }

    pub fn choice(definition_id: impl Into<String>, value: ChoiceValue) -> Self {
        Self::new(definition_id, SettingKind::Choice(value))
    }

    pub fn group_collection(definition_id: impl Into<String>, groups: Vec<GroupValue>) -> Self {
        Self::new(definition_id, SettingKind::GroupCollection(groups))
    }

    /// Child lists hanging off this node, one per choice or group entry.
    ///
    /// Leaf kinds yield nothing.
    pub fn child_lists(&self) -> Box<dyn Iterator<Item = &[SettingNode]> + '_> {
        match &self.kind {
            SettingKind::Simple(_) | SettingKind::SimpleCollection(_) => {
                Box::new(std::iter::empty())
            }
            SettingKind::Choice(choice) => Box::new(std::iter::once(choice.children.as_slice())),
            SettingKind::ChoiceCollection(choices) => {
                Box::new(choices.iter().map(|c| c.children.as_slice()))
            }
            SettingKind::GroupCollection(groups) => {
                Box::new(groups.iter().map(|g| g.children.as_slice()))
            }
        }
    }

    /// Direct children across every entry, in order
    pub fn children(&self) -> impl Iterator<Item = &SettingNode> {
        self.child_lists().flatten()
    }

    /// Number of levels in the subtree rooted here; a lone node has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children().map(SettingNode::depth).max().unwrap_or(0)
    }

    /// Number of nodes in the subtree rooted here, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children().map(SettingNode::node_count).sum::<usize>()
    }
}
