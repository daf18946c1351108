// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the wire contract

use thiserror::Error;

/// Errors that can occur while interpreting wire payloads
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Unknown setting instance kind: {0}")]
    UnknownInstanceKind(String),

    #[error("Unknown setting value kind: {0}")]
    UnknownValueKind(String),

    #[error("Unknown secret value state: {0}")]
    UnknownValueState(String),
}

/// Error envelope returned by the service on failed requests
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServiceErrorResponse {
    pub error: ServiceError,
}

/// Body of a service error
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<serde_json::Value>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
