// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire contract for the remote policy settings collection
//!
//! The remote service stores a policy's settings as a flat list of wire
//! settings, each holding one setting instance. Every instance and every
//! value carries an `@odata.type` discriminator naming its kind; the payload
//! lives in exactly one of five kind-specific fields.
//!
//! These types are deliberately lenient on input: discriminators and payloads
//! are optional so that a page containing a kind this crate does not know can
//! still be parsed, leaving the decision to skip it to the tree decoder.

pub mod error;
pub mod kinds;
pub mod types;

pub use error::*;
pub use kinds::*;
pub use types::*;
