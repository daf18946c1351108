// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Strongly-typed configuration sections.
//!
//! `ServiceRoot` is flattened into the root of the configuration; `shape` and
//! `paging` stay as nested sections. Every field is optional so that a
//! section can be extracted from any single layer as well as from the merged
//! result.

pub mod service;
pub mod shape;
