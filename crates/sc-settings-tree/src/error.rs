// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Node-local errors raised while encoding or decoding a settings tree

use sc_domain_types::ValueType;
use thiserror::Error;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors confined to a single node.
///
/// None of these abort a whole tree by themselves: the encoder and decoder
/// report them per node and the caller decides what a failure means for the
/// operation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A leaf's declared scalar type disagrees with its payload
    #[error("setting '{definition_id}' declares type {value_type} but value {value:?} cannot be converted: {reason}")]
    Conversion {
        definition_id: String,
        value_type: ValueType,
        value: String,
        reason: String,
    },

    /// A wire discriminator is missing or not one of the supported kinds
    #[error("setting '{definition_id}' has unsupported kind {}", .kind.as_deref().unwrap_or("<missing>"))]
    UnsupportedKind {
        definition_id: String,
        kind: Option<String>,
    },

    /// A wire node names a kind whose payload field is absent
    #[error("setting '{definition_id}' of kind {kind} carries no {field} payload")]
    MissingPayload {
        definition_id: String,
        kind: &'static str,
        field: &'static str,
    },
}

impl TreeError {
    /// Identifier of the setting the error belongs to
    pub fn definition_id(&self) -> &str {
        match self {
            TreeError::Conversion { definition_id, .. }
            | TreeError::UnsupportedKind { definition_id, .. }
            | TreeError::MissingPayload { definition_id, .. } => definition_id,
        }
    }
}
