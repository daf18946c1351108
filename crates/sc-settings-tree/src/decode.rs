// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire to client model decoding
//!
//! Dispatch is on the `@odata.type` discriminator. A node with a missing or
//! unknown discriminator is dropped together with its subtree, and decoding
//! carries on with its siblings. Every drop is recorded in a
//! [`DecodeReport`] so that a partial read is never mistaken for a complete
//! one.

use sc_domain_types::{
    ChoiceValue, GroupValue, InstanceTemplateReference, Policy, PolicySetting, SecretValueState,
    SettingKind, SettingNode, SimpleValue, ValueTemplateReference, ValueType,
};
use sc_rest_api_contract::{
    InstanceKind, ValueKind, WireChoiceSettingValue, WireGroupSettingValue,
    WireInstanceTemplateReference, WireScalar, WireSetting, WireSettingInstance,
    WireSimpleSettingValue, WireValueState, WireValueTemplateReference,
};

use crate::error::{Result, TreeError};

/// Counts of what a decode saw versus what it produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Root items received
    pub wire_count: usize,
    /// Root items that made it into the result
    pub decoded_count: usize,
    /// Every dropped node, at any depth
    pub failures: Vec<TreeError>,
}

impl DecodeReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True only when nothing was dropped anywhere in the tree
    pub fn is_consistent(&self) -> bool {
        self.failures.is_empty() && self.wire_count == self.decoded_count
    }
}

/// A decoded value together with its report
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub report: DecodeReport,
}

impl<T> Decoded<T> {
    pub fn into_parts(self) -> (T, DecodeReport) {
        (self.value, self.report)
    }
}

/// Decode one wire node.
///
/// Fails only when the node itself cannot be decoded; dropped descendants
/// are reported instead.
pub fn decode_node(wire: &WireSettingInstance) -> Result<Decoded<SettingNode>> {
    let mut decoder = Decoder::default();
    let value = decoder.instance(wire)?;
    Ok(Decoded {
        value,
        report: DecodeReport {
            wire_count: 1,
            decoded_count: 1,
            failures: decoder.failures,
        },
    })
}

/// Decode a full wire settings list into a policy
pub fn decode_policy(settings: &[WireSetting]) -> Decoded<Policy> {
    let mut decoder = Decoder::default();
    let mut decoded = Vec::with_capacity(settings.len());
    for setting in settings {
        match decoder.instance(&setting.setting_instance) {
            Ok(node) => decoded.push(PolicySetting {
                id: setting.id.clone(),
                node,
            }),
            Err(e) => decoder.failures.push(e),
        }
    }

    let decoded_count = decoded.len();
    Decoded {
        value: Policy::new(decoded),
        report: DecodeReport {
            wire_count: settings.len(),
            decoded_count,
            failures: decoder.failures,
        },
    }
}

#[derive(Default)]
struct Decoder {
    failures: Vec<TreeError>,
}

impl Decoder {
    fn instance(&mut self, wire: &WireSettingInstance) -> Result<SettingNode> {
        let id = wire.setting_definition_id.as_str();
        let kind = instance_kind(id, wire.odata_type.as_deref())?;

        let kind = match kind {
            InstanceKind::Simple => {
                let value = wire
                    .simple_setting_value
                    .as_ref()
                    .ok_or_else(|| missing(id, "simple", "simpleSettingValue"))?;
                SettingKind::Simple(decode_simple(id, value)?)
            }
            InstanceKind::SimpleCollection => SettingKind::SimpleCollection(
                wire.simple_setting_collection_value
                    .iter()
                    .flatten()
                    .map(|v| decode_simple(id, v))
                    .collect::<Result<Vec<_>>>()?,
            ),
            InstanceKind::Choice => {
                let choice = wire
                    .choice_setting_value
                    .as_ref()
                    .ok_or_else(|| missing(id, "choice", "choiceSettingValue"))?;
                SettingKind::Choice(self.choice(id, "choice", choice)?)
            }
            InstanceKind::ChoiceCollection => SettingKind::ChoiceCollection(
                wire.choice_setting_collection_value
                    .iter()
                    .flatten()
                    .map(|c| self.choice(id, "choice_collection", c))
                    .collect::<Result<Vec<_>>>()?,
            ),
            InstanceKind::GroupCollection => SettingKind::GroupCollection(
                wire.group_setting_collection_value
                    .iter()
                    .flatten()
                    .map(|g| self.group(g))
                    .collect(),
            ),
        };

        Ok(SettingNode {
            definition_id: wire.setting_definition_id.clone(),
            instance_template_reference: wire
                .setting_instance_template_reference
                .as_ref()
                .map(instance_template),
            kind,
        })
    }

    /// A choice without a selected option is rejected, never defaulted
    fn choice(
        &mut self,
        definition_id: &str,
        kind: &'static str,
        choice: &WireChoiceSettingValue,
    ) -> Result<ChoiceValue> {
        let value = choice
            .value
            .clone()
            .ok_or_else(|| missing(definition_id, kind, "value"))?;
        Ok(ChoiceValue {
            value,
            value_template_reference: choice
                .setting_value_template_reference
                .as_ref()
                .map(value_template),
            children: self.children(choice.children.as_deref()),
        })
    }

    fn group(&mut self, group: &WireGroupSettingValue) -> GroupValue {
        GroupValue {
            value_template_reference: group
                .setting_value_template_reference
                .as_ref()
                .map(value_template),
            children: self.children(group.children.as_deref()),
        }
    }

    /// Absent child lists decode to empty ones
    fn children(&mut self, children: Option<&[WireSettingInstance]>) -> Vec<SettingNode> {
        let children = children.unwrap_or_default();
        let mut decoded = Vec::with_capacity(children.len());
        for child in children {
            match self.instance(child) {
                Ok(node) => decoded.push(node),
                Err(e) => self.failures.push(e),
            }
        }
        decoded
    }
}

fn instance_kind(definition_id: &str, odata_type: Option<&str>) -> Result<InstanceKind> {
    let unsupported = || TreeError::UnsupportedKind {
        definition_id: definition_id.to_string(),
        kind: odata_type.map(str::to_string),
    };
    odata_type.ok_or_else(unsupported)?.parse().map_err(|_| unsupported())
}

fn missing(definition_id: &str, kind: &'static str, field: &'static str) -> TreeError {
    TreeError::MissingPayload {
        definition_id: definition_id.to_string(),
        kind,
        field,
    }
}

/// Narrow on the value's own subtype rather than the instance discriminator
fn decode_simple(definition_id: &str, wire: &WireSimpleSettingValue) -> Result<SimpleValue> {
    let odata_type = wire.odata_type.as_deref();
    let unsupported = || TreeError::UnsupportedKind {
        definition_id: definition_id.to_string(),
        kind: odata_type.map(str::to_string),
    };
    let kind: ValueKind = odata_type
        .ok_or_else(unsupported)?
        .parse()
        .map_err(|_| unsupported())?;

    let value_type = match kind {
        ValueKind::String => ValueType::String,
        ValueKind::Integer => ValueType::Integer,
        ValueKind::Secret => ValueType::Secret,
        ValueKind::Choice | ValueKind::Group => return Err(unsupported()),
    };

    let value = match (&wire.value, value_type) {
        (None, _) => String::new(),
        (Some(WireScalar::Integer(n)), _) => n.to_string(),
        (Some(WireScalar::Text(text)), ValueType::Integer) => text
            .trim()
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|e| TreeError::Conversion {
                definition_id: definition_id.to_string(),
                value_type,
                value: text.clone(),
                reason: e.to_string(),
            })?,
        (Some(WireScalar::Text(text)), _) => text.clone(),
        (Some(WireScalar::Other(_)), _) => return Err(unsupported()),
    };

    let value_state = match (value_type, wire.value_state.as_deref()) {
        (ValueType::Secret, Some(state)) => Some(secret_state(definition_id, state)?),
        _ => None,
    };

    Ok(SimpleValue {
        value_type,
        value,
        value_state,
        value_template_reference: wire.setting_value_template_reference.as_ref().map(value_template),
    })
}

fn secret_state(definition_id: &str, raw: &str) -> Result<SecretValueState> {
    let state: WireValueState = raw.parse().map_err(|_| TreeError::Conversion {
        definition_id: definition_id.to_string(),
        value_type: ValueType::Secret,
        value: raw.to_string(),
        reason: "unknown secret value state".to_string(),
    })?;
    Ok(match state {
        WireValueState::Invalid => SecretValueState::Invalid,
        WireValueState::NotEncrypted => SecretValueState::NotEncrypted,
        WireValueState::EncryptedValueToken => SecretValueState::EncryptedValueToken,
    })
}

fn instance_template(reference: &WireInstanceTemplateReference) -> InstanceTemplateReference {
    InstanceTemplateReference {
        template_id: reference.setting_instance_template_id.clone(),
    }
}

fn value_template(reference: &WireValueTemplateReference) -> ValueTemplateReference {
    ValueTemplateReference {
        template_id: reference.setting_value_template_id.clone(),
        use_template_default: reference.use_template_default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_rest_api_contract::SettingsPage;
    use serde_json::json;

    fn wire(value: serde_json::Value) -> WireSettingInstance {
        serde_json::from_value(value).unwrap()
    }

    const CHOICE: &str = "#microsoft.graph.deviceManagementConfigurationChoiceSettingInstance";
    const CHOICE_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationChoiceSettingValue";
    const SIMPLE: &str = "#microsoft.graph.deviceManagementConfigurationSimpleSettingInstance";
    const INTEGER: &str = "#microsoft.graph.deviceManagementConfigurationIntegerSettingValue";
    const SECRET: &str = "#microsoft.graph.deviceManagementConfigurationSecretSettingValue";

    #[test]
    fn test_integer_number_decodes_to_string() {
        let node = wire(json!({
            "@odata.type": SIMPLE,
            "settingDefinitionId": "timeout",
            "simpleSettingValue": { "@odata.type": INTEGER, "value": 30 }
        }));
        let decoded = decode_node(&node).unwrap().value;
        assert_eq!(decoded.kind, SettingKind::Simple(SimpleValue::integer(30)));
    }

    #[test]
    fn test_integer_text_must_parse() {
        let node = wire(json!({
            "@odata.type": SIMPLE,
            "settingDefinitionId": "timeout",
            "simpleSettingValue": { "@odata.type": INTEGER, "value": "soon" }
        }));
        assert!(matches!(
            decode_node(&node),
            Err(TreeError::Conversion { value_type: ValueType::Integer, .. })
        ));
    }

    #[test]
    fn test_secret_state_decodes() {
        let node = wire(json!({
            "@odata.type": SIMPLE,
            "settingDefinitionId": "password",
            "simpleSettingValue": {
                "@odata.type": SECRET,
                "value": "token",
                "valueState": "encryptedValueToken"
            }
        }));
        let decoded = decode_node(&node).unwrap().value;
        assert_eq!(
            decoded.kind,
            SettingKind::Simple(SimpleValue::secret(
                "token",
                SecretValueState::EncryptedValueToken
            ))
        );
    }

    #[test]
    fn test_unknown_secret_state_is_rejected() {
        let node = wire(json!({
            "@odata.type": SIMPLE,
            "settingDefinitionId": "password",
            "simpleSettingValue": { "@odata.type": SECRET, "value": "x", "valueState": "sealed" }
        }));
        assert!(decode_node(&node).is_err());
    }

    #[test]
    fn test_missing_discriminator_is_unsupported() {
        let node = wire(json!({ "settingDefinitionId": "mystery" }));
        assert_eq!(
            decode_node(&node).unwrap_err(),
            TreeError::UnsupportedKind {
                definition_id: "mystery".into(),
                kind: None
            }
        );
    }

    #[test]
    fn test_missing_payload_is_reported() {
        let node = wire(json!({ "@odata.type": CHOICE, "settingDefinitionId": "mode" }));
        assert!(matches!(
            decode_node(&node),
            Err(TreeError::MissingPayload { kind: "choice", .. })
        ));
    }

    #[test]
    fn test_choice_without_selected_option_is_rejected() {
        let node = wire(json!({
            "@odata.type": CHOICE,
            "settingDefinitionId": "mode",
            "choiceSettingValue": { "@odata.type": CHOICE_VALUE, "children": [] }
        }));
        assert_eq!(
            decode_node(&node).unwrap_err(),
            TreeError::MissingPayload {
                definition_id: "mode".into(),
                kind: "choice",
                field: "value"
            }
        );
    }

    #[test]
    fn test_choice_collection_entry_without_option_drops_the_node() {
        let settings = vec![WireSetting {
            id: None,
            setting_instance: wire(json!({
                "@odata.type": "#microsoft.graph.deviceManagementConfigurationChoiceSettingCollectionInstance",
                "settingDefinitionId": "modes",
                "choiceSettingCollectionValue": [
                    { "@odata.type": CHOICE_VALUE, "value": "modes_1" },
                    { "@odata.type": CHOICE_VALUE }
                ]
            })),
        }];
        let decoded = decode_policy(&settings);
        assert!(decoded.value.is_empty());
        assert!(matches!(
            decoded.report.failures.as_slice(),
            [TreeError::MissingPayload { kind: "choice_collection", field: "value", .. }]
        ));
    }

    #[test]
    fn test_unmodelled_scalar_is_dropped_with_siblings_kept() {
        let page: SettingsPage = serde_json::from_value(json!({
            "value": [
                { "settingInstance": {
                    "@odata.type": SIMPLE,
                    "settingDefinitionId": "name",
                    "simpleSettingValue": {
                        "@odata.type": "#microsoft.graph.deviceManagementConfigurationStringSettingValue",
                        "value": "kiosk"
                    }
                } },
                { "settingInstance": {
                    "@odata.type": SIMPLE,
                    "settingDefinitionId": "flag",
                    "simpleSettingValue": {
                        "@odata.type": "#microsoft.graph.deviceManagementConfigurationBooleanSettingValue",
                        "value": true
                    }
                } },
                { "settingInstance": {
                    "@odata.type": SIMPLE,
                    "settingDefinitionId": "ratio",
                    "simpleSettingValue": {
                        "@odata.type": "#microsoft.graph.deviceManagementConfigurationStringSettingValue",
                        "value": 0.5
                    }
                } }
            ]
        }))
        .unwrap();

        let decoded = decode_policy(&page.items);
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value.settings[0].node.definition_id, "name");
        assert_eq!(decoded.report.failure_count(), 2);
        assert!(decoded
            .report
            .failures
            .iter()
            .all(|f| matches!(f, TreeError::UnsupportedKind { .. })));
    }

    #[test]
    fn test_absent_children_become_empty() {
        let node = wire(json!({
            "@odata.type": CHOICE,
            "settingDefinitionId": "mode",
            "choiceSettingValue": { "@odata.type": CHOICE_VALUE, "value": "mode_1" }
        }));
        let decoded = decode_node(&node).unwrap();
        assert_eq!(
            decoded.value.kind,
            SettingKind::Choice(ChoiceValue::new("mode_1"))
        );
        assert!(decoded.report.is_consistent());
    }

    #[test]
    fn test_child_failure_is_isolated_and_counted() {
        let node = wire(json!({
            "@odata.type": CHOICE,
            "settingDefinitionId": "parent",
            "choiceSettingValue": {
                "@odata.type": CHOICE_VALUE,
                "value": "parent_1",
                "children": [
                    {
                        "@odata.type": SIMPLE,
                        "settingDefinitionId": "good",
                        "simpleSettingValue": { "@odata.type": INTEGER, "value": 1 }
                    },
                    {
                        "@odata.type": "#microsoft.graph.deviceManagementConfigurationFutureSettingInstance",
                        "settingDefinitionId": "future"
                    }
                ]
            }
        }));

        let (node, report) = decode_node(&node).unwrap().into_parts();
        let children: Vec<_> = node.children().map(|c| c.definition_id.as_str()).collect();
        assert_eq!(children, vec!["good"]);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].definition_id(), "future");
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_policy_counts_dropped_roots() {
        let settings = vec![
            WireSetting {
                id: Some("0".into()),
                setting_instance: wire(json!({
                    "@odata.type": SIMPLE,
                    "settingDefinitionId": "a",
                    "simpleSettingValue": { "@odata.type": INTEGER, "value": 1 }
                })),
            },
            WireSetting {
                id: Some("1".into()),
                setting_instance: wire(json!({ "@odata.type": "unknown", "settingDefinitionId": "b" })),
            },
        ];

        let decoded = decode_policy(&settings);
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value.settings[0].id.as_deref(), Some("0"));
        assert_eq!(decoded.report.wire_count, 2);
        assert_eq!(decoded.report.decoded_count, 1);
        assert_eq!(decoded.report.failure_count(), 1);
    }

    #[test]
    fn test_empty_policy_is_consistent() {
        let decoded = decode_policy(&[]);
        assert!(decoded.value.is_empty());
        assert!(decoded.report.is_consistent());
    }
}
