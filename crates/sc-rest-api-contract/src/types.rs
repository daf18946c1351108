// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire types for settings, instances and values

use serde::{Deserialize, Serialize};

/// One entry of a policy's settings collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub setting_instance: WireSettingInstance,
}

/// One node of the wire settings tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSettingInstance {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    #[serde(default)]
    pub setting_definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_instance_template_reference: Option<WireInstanceTemplateReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_setting_value: Option<WireSimpleSettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_setting_collection_value: Option<Vec<WireSimpleSettingValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_setting_value: Option<WireChoiceSettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_setting_collection_value: Option<Vec<WireChoiceSettingValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_setting_collection_value: Option<Vec<WireGroupSettingValue>>,
}

/// Template reference on an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInstanceTemplateReference {
    pub setting_instance_template_id: String,
}

/// Template reference on a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireValueTemplateReference {
    pub setting_value_template_id: String,
    #[serde(default)]
    pub use_template_default: bool,
}

/// Scalar payload as carried on the wire: integers travel as JSON numbers.
///
/// `Other` keeps scalars of subtypes this crate does not model (booleans,
/// floats) so the rest of the page still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

/// A string, integer or secret value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSimpleSettingValue {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WireScalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_reference: Option<WireValueTemplateReference>,
}

/// A selected option and its child instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChoiceSettingValue {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// The service may omit this field or send `null` for leaf choices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WireSettingInstance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_reference: Option<WireValueTemplateReference>,
}

/// One group instance and its child instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGroupSettingValue {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WireSettingInstance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_reference: Option<WireValueTemplateReference>,
}

/// Request body submitted when creating or replacing a policy's settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireSettingsCollection {
    pub settings: Vec<WireSetting>,
}

/// One page of a paged settings read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPage {
    #[serde(rename = "value", default)]
    pub items: Vec<WireSetting>,
    /// Continuation token: the absolute URL of the next page
    #[serde(
        rename = "@odata.nextLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{InstanceKind, ValueKind};

    #[test]
    fn test_page_parsing_with_null_payloads() {
        let body = r##"{
            "@odata.context": "https://example.invalid/$metadata#settings",
            "value": [
                {
                    "id": "0",
                    "settingInstance": {
                        "@odata.type": "#microsoft.graph.deviceManagementConfigurationChoiceSettingInstance",
                        "settingDefinitionId": "defender_allowarchivescanning",
                        "settingInstanceTemplateReference": null,
                        "choiceSettingValue": {
                            "settingValueTemplateReference": null,
                            "value": "defender_allowarchivescanning_1",
                            "children": []
                        }
                    }
                }
            ],
            "@odata.nextLink": "https://example.invalid/settings?$skiptoken=abc"
        }"##;

        let page: SettingsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(
            page.next_link.as_deref(),
            Some("https://example.invalid/settings?$skiptoken=abc")
        );

        let instance = &page.items[0].setting_instance;
        assert_eq!(
            instance.odata_type.as_deref(),
            Some(InstanceKind::Choice.odata_type())
        );
        assert!(instance.setting_instance_template_reference.is_none());
        let choice = instance.choice_setting_value.as_ref().unwrap();
        assert_eq!(choice.children.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_unknown_kind_still_parses() {
        let body = r##"{
            "settingInstance": {
                "@odata.type": "#microsoft.graph.deviceManagementConfigurationFutureInstance",
                "settingDefinitionId": "future",
                "futureSettingValue": { "value": 1 }
            }
        }"##;

        let setting: WireSetting = serde_json::from_str(body).unwrap();
        assert_eq!(setting.setting_instance.setting_definition_id, "future");
        assert!(setting.setting_instance.simple_setting_value.is_none());
    }

    #[test]
    fn test_scalar_payloads() {
        let int_value: WireSimpleSettingValue = serde_json::from_str(
            r##"{ "@odata.type": "#microsoft.graph.deviceManagementConfigurationIntegerSettingValue", "value": 42 }"##,
        )
        .unwrap();
        assert_eq!(int_value.value, Some(WireScalar::Integer(42)));

        let text_value: WireSimpleSettingValue =
            serde_json::from_str(r#"{ "value": "42" }"#).unwrap();
        assert_eq!(text_value.value, Some(WireScalar::Text("42".into())));

        let flag: WireSimpleSettingValue = serde_json::from_str(r#"{ "value": true }"#).unwrap();
        assert_eq!(flag.value, Some(WireScalar::Other(serde_json::Value::Bool(true))));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let instance = WireSettingInstance {
            odata_type: Some(InstanceKind::Simple.odata_type().to_string()),
            setting_definition_id: "timeout".into(),
            simple_setting_value: Some(WireSimpleSettingValue {
                odata_type: Some(ValueKind::Integer.odata_type().to_string()),
                value: Some(WireScalar::Integer(30)),
                ..Default::default()
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&instance).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(json["simpleSettingValue"]["value"], 30);
        assert!(object.get("choiceSettingValue").is_none());
    }
}
