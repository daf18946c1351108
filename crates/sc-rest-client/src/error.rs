// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the REST client

use reqwest::StatusCode;
use sc_rest_api_contract::ServiceError;
use sc_settings_tree::TreeError;
use thiserror::Error;

pub type RestClientResult<T> = Result<T, RestClientError>;

#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Server error {status}: {error}")]
    ServerError { status: StatusCode, error: ServiceError },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The same continuation link came back twice; following it would loop
    #[error("Continuation link repeated after {pages} page(s): {link}")]
    RepeatedContinuation { link: String, pages: usize },

    #[error("Settings collection cancelled after {pages} page(s)")]
    Cancelled { pages: usize },

    #[error("Settings could not be encoded: {0}")]
    Encode(#[from] TreeError),
}

impl RestClientError {
    /// Status code for server-side failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestClientError::ServerError { status, .. } => Some(*status),
            RestClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}
