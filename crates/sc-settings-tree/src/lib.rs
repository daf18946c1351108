// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recursive settings tree support
//!
//! Four components live here, leaves first:
//!
//! - [`depth`]: estimates how deeply a policy nests and keeps the process-wide
//!   maximum so shape declarations are generated once with a safe bound.
//! - [`shape`]: builds the static declaration of every legal node shape up to
//!   a depth bound, one definition per level so the size stays linear.
//! - [`encode`]: client model to wire, exactly mirroring what was authored.
//! - [`decode`]: wire to client model, dropping unsupported nodes while
//!   counting them so a partial read never looks like a complete one.
//!
//! Encoding and decoding are pure and never depth-limited; only the shape
//! declaration is bounded.

pub mod decode;
pub mod depth;
pub mod encode;
pub mod error;
pub mod shape;

pub use decode::{decode_node, decode_policy, Decoded, DecodeReport};
pub use depth::{DepthEstimator, MIN_SAFE_DEPTH, PLATFORM_MAX_DEPTH};
pub use encode::{encode_node, encode_policy, encode_policy_partial, EncodeReport};
pub use error::{Result, TreeError};
pub use shape::{
    build_shape, resolve_depth, DepthSettings, DepthSource, ResolvedDepth, ShapeCache, ShapeDecl,
    ShapeError, DEFAULT_CONSTRAINED_DEPTH,
};
