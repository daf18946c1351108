// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client model to wire encoding
//!
//! The encoder mirrors exactly what was authored: order is preserved, every
//! composite carries its child list even when empty, and template references
//! are copied verbatim. It has no side effects; logging the outcome is left to
//! the caller.

use sc_domain_types::{
    ChoiceValue, GroupValue, InstanceTemplateReference, Policy, PolicySetting, SecretValueState,
    SettingKind, SettingNode, SimpleValue, ValueTemplateReference, ValueType,
};
use sc_rest_api_contract::{
    InstanceKind, ValueKind, WireChoiceSettingValue, WireGroupSettingValue,
    WireInstanceTemplateReference, WireScalar, WireSetting, WireSettingInstance,
    WireSettingsCollection, WireSimpleSettingValue, WireValueState, WireValueTemplateReference,
};

use crate::error::{Result, TreeError};

/// Outcome of a lenient encode: what could be encoded plus what could not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeReport {
    pub collection: WireSettingsCollection,
    pub failures: Vec<TreeError>,
}

impl EncodeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Encode a single node and its whole subtree; the first failure aborts
pub fn encode_node(node: &SettingNode) -> Result<WireSettingInstance> {
    Encoder::strict().instance(node)
}

/// Encode a whole policy, failing on the first node that cannot be converted
pub fn encode_policy(policy: &Policy) -> Result<WireSettingsCollection> {
    let mut encoder = Encoder::strict();
    let settings = policy
        .iter()
        .map(|setting| encoder.setting(setting))
        .collect::<Result<Vec<_>>>()?;
    Ok(WireSettingsCollection { settings })
}

/// Encode a policy, dropping nodes that fail and collecting their errors.
///
/// A failing node takes its subtree with it; its siblings and ancestors are
/// still encoded.
pub fn encode_policy_partial(policy: &Policy) -> EncodeReport {
    let mut encoder = Encoder::lenient();
    let mut settings = Vec::with_capacity(policy.len());
    for setting in policy.iter() {
        match encoder.setting(setting) {
            Ok(wire) => settings.push(wire),
            Err(e) => encoder.record(e),
        }
    }
    EncodeReport {
        collection: WireSettingsCollection { settings },
        failures: encoder.failures.unwrap_or_default(),
    }
}

/// Failure sink; `None` means the first child failure propagates
struct Encoder {
    failures: Option<Vec<TreeError>>,
}

impl Encoder {
    fn strict() -> Self {
        Self { failures: None }
    }

    fn lenient() -> Self {
        Self {
            failures: Some(Vec::new()),
        }
    }

    fn record(&mut self, error: TreeError) {
        if let Some(failures) = self.failures.as_mut() {
            failures.push(error);
        }
    }

    fn setting(&mut self, setting: &PolicySetting) -> Result<WireSetting> {
        Ok(WireSetting {
            id: setting.id.clone(),
            setting_instance: self.instance(&setting.node)?,
        })
    }

    fn instance(&mut self, node: &SettingNode) -> Result<WireSettingInstance> {
        let id = node.definition_id.as_str();
        let mut wire = WireSettingInstance {
            setting_definition_id: node.definition_id.clone(),
            setting_instance_template_reference: node
                .instance_template_reference
                .as_ref()
                .map(instance_template),
            ..WireSettingInstance::default()
        };

        let kind = match &node.kind {
            SettingKind::Simple(value) => {
                wire.simple_setting_value = Some(encode_simple(id, value)?);
                InstanceKind::Simple
            }
            SettingKind::SimpleCollection(values) => {
                let values = values
                    .iter()
                    .map(|v| encode_simple(id, v))
                    .collect::<Result<Vec<_>>>()?;
                wire.simple_setting_collection_value = Some(values);
                InstanceKind::SimpleCollection
            }
            SettingKind::Choice(choice) => {
                wire.choice_setting_value = Some(self.choice(choice)?);
                InstanceKind::Choice
            }
            SettingKind::ChoiceCollection(choices) => {
                let choices = choices
                    .iter()
                    .map(|c| self.choice(c))
                    .collect::<Result<Vec<_>>>()?;
                wire.choice_setting_collection_value = Some(choices);
                InstanceKind::ChoiceCollection
            }
            SettingKind::GroupCollection(groups) => {
                let groups = groups
                    .iter()
                    .map(|g| self.group(g))
                    .collect::<Result<Vec<_>>>()?;
                wire.group_setting_collection_value = Some(groups);
                InstanceKind::GroupCollection
            }
        };
        wire.odata_type = Some(kind.odata_type().to_string());
        Ok(wire)
    }

    fn choice(&mut self, choice: &ChoiceValue) -> Result<WireChoiceSettingValue> {
        Ok(WireChoiceSettingValue {
            odata_type: Some(ValueKind::Choice.odata_type().to_string()),
            value: Some(choice.value.clone()),
            children: Some(self.children(&choice.children)?),
            setting_value_template_reference: choice
                .value_template_reference
                .as_ref()
                .map(value_template),
        })
    }

    fn group(&mut self, group: &GroupValue) -> Result<WireGroupSettingValue> {
        Ok(WireGroupSettingValue {
            odata_type: Some(ValueKind::Group.odata_type().to_string()),
            children: Some(self.children(&group.children)?),
            setting_value_template_reference: group
                .value_template_reference
                .as_ref()
                .map(value_template),
        })
    }

    fn children(&mut self, children: &[SettingNode]) -> Result<Vec<WireSettingInstance>> {
        let mut encoded = Vec::with_capacity(children.len());
        for child in children {
            match self.instance(child) {
                Ok(wire) => encoded.push(wire),
                Err(e) if self.failures.is_some() => self.record(e),
                Err(e) => return Err(e),
            }
        }
        Ok(encoded)
    }
}

fn encode_simple(definition_id: &str, value: &SimpleValue) -> Result<WireSimpleSettingValue> {
    let (kind, scalar, state) = match value.value_type {
        ValueType::String => (ValueKind::String, WireScalar::Text(value.value.clone()), None),
        ValueType::Integer => (
            ValueKind::Integer,
            WireScalar::Integer(parse_integer(definition_id, &value.value)?),
            None,
        ),
        ValueType::Secret => (
            ValueKind::Secret,
            WireScalar::Text(value.value.clone()),
            value.value_state.map(wire_value_state),
        ),
    };

    Ok(WireSimpleSettingValue {
        odata_type: Some(kind.odata_type().to_string()),
        value: Some(scalar),
        value_state: state.map(|s| s.as_str().to_string()),
        setting_value_template_reference: value.value_template_reference.as_ref().map(value_template),
    })
}

fn parse_integer(definition_id: &str, raw: &str) -> Result<i64> {
    let conversion = |reason: String| TreeError::Conversion {
        definition_id: definition_id.to_string(),
        value_type: ValueType::Integer,
        value: raw.to_string(),
        reason,
    };
    let parsed: i64 = raw.parse().map_err(|e: std::num::ParseIntError| conversion(e.to_string()))?;
    i32::try_from(parsed).map_err(|_| conversion("out of 32-bit range".to_string()))?;
    // Decoding only ever yields the canonical spelling
    if parsed.to_string() != raw {
        return Err(conversion("not in canonical form".to_string()));
    }
    Ok(parsed)
}

fn wire_value_state(state: SecretValueState) -> WireValueState {
    match state {
        SecretValueState::Invalid => WireValueState::Invalid,
        SecretValueState::NotEncrypted => WireValueState::NotEncrypted,
        SecretValueState::EncryptedValueToken => WireValueState::EncryptedValueToken,
    }
}

fn instance_template(reference: &InstanceTemplateReference) -> WireInstanceTemplateReference {
    WireInstanceTemplateReference {
        setting_instance_template_id: reference.template_id.clone(),
    }
}

fn value_template(reference: &ValueTemplateReference) -> WireValueTemplateReference {
    WireValueTemplateReference {
        setting_value_template_id: reference.template_id.clone(),
        use_template_default: reference.use_template_default,
    }
}
