// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for policy settings
//!
//! A policy is an ordered list of root settings. Every setting is the root of
//! a tree whose nodes are one of five kinds: a scalar value, a single choice,
//! a collection of scalars, a collection of choices, or a collection of
//! groups. Choice and group entries carry child nodes of any kind, which is
//! what makes the tree recursive.
//!
//! These types are what users author and what the rest of the system diffs
//! against. They are rebuilt from scratch on every read and every write and
//! are never mutated in place by the codec.

pub mod node;
pub mod policy;
pub mod value;

pub use node::*;
pub use policy::*;
pub use value::*;
