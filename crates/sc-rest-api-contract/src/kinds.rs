// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! `@odata.type` discriminators for instances and values

use std::str::FromStr;

use crate::error::ApiContractError;

/// Kind of a setting instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    Simple,
    SimpleCollection,
    Choice,
    ChoiceCollection,
    GroupCollection,
}

impl InstanceKind {
    pub const ALL: [InstanceKind; 5] = [
        InstanceKind::Simple,
        InstanceKind::SimpleCollection,
        InstanceKind::Choice,
        InstanceKind::ChoiceCollection,
        InstanceKind::GroupCollection,
    ];

    pub const fn odata_type(self) -> &'static str {
        match self {
            InstanceKind::Simple => {
                "#microsoft.graph.deviceManagementConfigurationSimpleSettingInstance"
            }
            InstanceKind::SimpleCollection => {
                "#microsoft.graph.deviceManagementConfigurationSimpleSettingCollectionInstance"
            }
            InstanceKind::Choice => {
                "#microsoft.graph.deviceManagementConfigurationChoiceSettingInstance"
            }
            InstanceKind::ChoiceCollection => {
                "#microsoft.graph.deviceManagementConfigurationChoiceSettingCollectionInstance"
            }
            InstanceKind::GroupCollection => {
                "#microsoft.graph.deviceManagementConfigurationGroupSettingCollectionInstance"
            }
        }
    }
}

impl FromStr for InstanceKind {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstanceKind::ALL
            .into_iter()
            .find(|kind| kind.odata_type().eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiContractError::UnknownInstanceKind(s.to_string()))
    }
}

/// Kind of a setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Secret,
    Choice,
    Group,
}

impl ValueKind {
    pub const ALL: [ValueKind; 5] = [
        ValueKind::String,
        ValueKind::Integer,
        ValueKind::Secret,
        ValueKind::Choice,
        ValueKind::Group,
    ];

    pub const fn odata_type(self) -> &'static str {
        match self {
            ValueKind::String => "#microsoft.graph.deviceManagementConfigurationStringSettingValue",
            ValueKind::Integer => {
                "#microsoft.graph.deviceManagementConfigurationIntegerSettingValue"
            }
            ValueKind::Secret => "#microsoft.graph.deviceManagementConfigurationSecretSettingValue",
            ValueKind::Choice => "#microsoft.graph.deviceManagementConfigurationChoiceSettingValue",
            ValueKind::Group => "#microsoft.graph.deviceManagementConfigurationGroupSettingValue",
        }
    }
}

impl FromStr for ValueKind {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::ALL
            .into_iter()
            .find(|kind| kind.odata_type().eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiContractError::UnknownValueKind(s.to_string()))
    }
}

/// State tag carried by secret values on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireValueState {
    Invalid,
    NotEncrypted,
    EncryptedValueToken,
}

impl WireValueState {
    pub const fn as_str(self) -> &'static str {
        match self {
            WireValueState::Invalid => "invalid",
            WireValueState::NotEncrypted => "notEncrypted",
            WireValueState::EncryptedValueToken => "encryptedValueToken",
        }
    }
}

impl FromStr for WireValueState {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid" => Ok(WireValueState::Invalid),
            "notEncrypted" => Ok(WireValueState::NotEncrypted),
            "encryptedValueToken" => Ok(WireValueState::EncryptedValueToken),
            other => Err(ApiContractError::UnknownValueState(other.to_string())),
        }
    }
}
