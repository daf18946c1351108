// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Leaf value types, template references and per-entry payloads

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::node::SettingNode;

/// Underlying scalar kind of a simple value.
///
/// The value itself is always carried as a string; integers are only
/// converted at the wire boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Secret,
}

/// State tag attached to secret values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SecretValueState {
    Invalid,
    NotEncrypted,
    EncryptedValueToken,
}

/// Marks that a node's shape derives from a named template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceTemplateReference {
    pub template_id: String,
}

/// Marks that a value derives from a named template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueTemplateReference {
    pub template_id: String,
    #[serde(default)]
    pub use_template_default: bool,
}

/// A scalar leaf, used both for simple settings and simple collection entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleValue {
    pub value_type: ValueType,
    pub value: String,
    /// Only meaningful for [`ValueType::Secret`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_state: Option<SecretValueState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template_reference: Option<ValueTemplateReference>,
}

impl SimpleValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueType::String, value)
    }

    pub fn integer(value: i32) -> Self {
        Self::new(ValueType::Integer, value.to_string())
    }

    pub fn secret(value: impl Into<String>, state: SecretValueState) -> Self {
        Self {
            value_state: Some(state),
            ..Self::new(ValueType::Secret, value)
        }
    }

    pub fn new(value_type: ValueType, value: impl Into<String>) -> Self {
        Self {
            value_type,
            value: value.into(),
            value_state: None,
            value_template_reference: None,
        }
    }
}

/// One selected option plus the option-dependent child settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template_reference: Option<ValueTemplateReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SettingNode>,
}

impl ChoiceValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            value_template_reference: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SettingNode>) -> Self {
        self.children = children;
        self
    }
}

/// One instance of a group: a bag of child settings with no value of its own
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template_reference: Option<ValueTemplateReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SettingNode>,
}

impl GroupValue {
    pub fn new(children: Vec<SettingNode>) -> Self {
        Self {
            value_template_reference: None,
            children,
        }
    }
}
