// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST client for remote policy settings
//!
//! The client speaks to the management service's configuration-policy
//! resource. Reading goes through the [`PageCollector`], which follows
//! continuation links until the collection is exhausted; writing submits a
//! fully encoded settings collection in one request.
//!
//! Retries, backoff and timeouts are not handled here. Callers that need
//! them wrap the [`SettingsPageSource`] / [`PolicySubmitter`] seams.

pub mod auth;
pub mod client;
pub mod error;
pub mod paging;
pub mod policy_sync;

pub use auth::*;
pub use client::*;
pub use error::*;
pub use paging::*;
pub use policy_sync::*;
