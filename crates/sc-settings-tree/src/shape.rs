// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Depth-bounded shape declaration for settings trees
//!
//! A declarative consumer has to know every legal node shape up front. Each
//! depth level gets exactly one declaration, and a level's child lists refer
//! to the next level by reference instead of repeating it per kind. This
//! keeps the declaration linear in the bound; expanding the three recursive
//! kinds inline would triple it at every level.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use jsonschema::{Draft, JSONSchema};
use sc_domain_types::Policy;
use serde::Serialize;
use serde_json::{json, Map, Value as J};
use thiserror::Error;

use crate::depth::{DepthEstimator, PLATFORM_MAX_DEPTH};

/// Bound used in constrained environments such as CI runs
pub const DEFAULT_CONSTRAINED_DEPTH: u8 = 4;

const NODE_KINDS: [&str; 5] = [
    "simple",
    "simple_collection",
    "choice",
    "choice_collection",
    "group_collection",
];

/// Inputs to bound resolution that come from the operator or environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSettings {
    /// Explicit operator override; wins over everything else
    pub override_depth: Option<u8>,
    /// Constrained execution (CI, tests) forces `constrained_depth`
    pub constrained: bool,
    pub constrained_depth: u8,
}

impl Default for DepthSettings {
    fn default() -> Self {
        Self {
            override_depth: None,
            constrained: false,
            constrained_depth: DEFAULT_CONSTRAINED_DEPTH,
        }
    }
}

/// Where a resolved bound came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthSource {
    Override,
    Constrained,
    Cache,
    PlatformMax,
}

impl fmt::Display for DepthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthSource::Override => write!(f, "override"),
            DepthSource::Constrained => write!(f, "constrained"),
            DepthSource::Cache => write!(f, "cache"),
            DepthSource::PlatformMax => write!(f, "platform-max"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDepth {
    pub depth: u8,
    pub source: DepthSource,
}

/// Pick the bound for shape generation.
///
/// Priority: operator override, constrained environment, estimator cache
/// (when non-zero), platform maximum.
pub fn resolve_depth(settings: &DepthSettings, estimator: &DepthEstimator) -> ResolvedDepth {
    if let Some(depth) = settings.override_depth {
        return ResolvedDepth {
            depth: clamp_bound(depth),
            source: DepthSource::Override,
        };
    }
    if settings.constrained {
        return ResolvedDepth {
            depth: clamp_bound(settings.constrained_depth),
            source: DepthSource::Constrained,
        };
    }
    match estimator.resolved_depth() {
        0 => ResolvedDepth {
            depth: PLATFORM_MAX_DEPTH,
            source: DepthSource::PlatformMax,
        },
        cached => ResolvedDepth {
            depth: clamp_bound(cached),
            source: DepthSource::Cache,
        },
    }
}

fn clamp_bound(depth: u8) -> u8 {
    depth.clamp(1, PLATFORM_MAX_DEPTH)
}

/// Type of a declared attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Enum { values: &'static [&'static str] },
    Object { attributes: Vec<AttributeDecl> },
    List { element: Box<AttributeType> },
    /// Reference to the node declaration of another level
    Level { depth: u8 },
}

/// One named attribute of a node shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDecl {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
    #[serde(flatten)]
    pub ty: AttributeType,
}

impl AttributeDecl {
    fn required(name: &'static str, description: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            required: true,
            description,
            ty,
        }
    }

    fn optional(name: &'static str, description: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            required: false,
            description,
            ty,
        }
    }

    fn count(&self) -> usize {
        1 + count_type(&self.ty)
    }
}

fn count_type(ty: &AttributeType) -> usize {
    match ty {
        AttributeType::Object { attributes } => attributes.iter().map(AttributeDecl::count).sum(),
        AttributeType::List { element } => count_type(element),
        AttributeType::String
        | AttributeType::Bool
        | AttributeType::Enum { .. }
        | AttributeType::Level { .. } => 0,
    }
}

/// Node shape for one depth level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelShape {
    pub depth: u8,
    pub attributes: Vec<AttributeDecl>,
}

impl LevelShape {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether any entry kind at this level may carry children
    pub fn has_children(&self) -> bool {
        ["choice", "choice_collection", "group_collection"]
            .iter()
            .filter_map(|kind| self.attribute(kind))
            .any(|attr| entry_attributes(&attr.ty).iter().any(|a| a.name == "children"))
    }
}

fn entry_attributes(ty: &AttributeType) -> &[AttributeDecl] {
    match ty {
        AttributeType::Object { attributes } => attributes,
        AttributeType::List { element } => entry_attributes(element),
        _ => &[],
    }
}

/// Shape of every legal node up to a depth bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeDecl {
    pub bound: u8,
    pub levels: Vec<LevelShape>,
}

/// Build the shape declaration for `bound` levels (clamped to `1..=15`)
pub fn build_shape(bound: u8) -> ShapeDecl {
    let bound = clamp_bound(bound);
    let mut levels = Vec::with_capacity(usize::from(bound));
    build_level(1, bound, &mut levels);
    ShapeDecl { bound, levels }
}

fn build_level(depth: u8, bound: u8, levels: &mut Vec<LevelShape>) {
    let recurse = depth < bound;
    levels.push(LevelShape {
        depth,
        attributes: node_attributes(depth, recurse),
    });
    if recurse {
        build_level(depth + 1, bound, levels);
    }
}

fn node_attributes(depth: u8, recurse: bool) -> Vec<AttributeDecl> {
    let mut attributes = Vec::with_capacity(9);
    if depth == 1 {
        attributes.push(AttributeDecl::optional(
            "id",
            "Identifier assigned by the service",
            AttributeType::String,
        ));
    }
    attributes.extend([
        AttributeDecl::required(
            "definition_id",
            "Setting definition this node instantiates",
            AttributeType::String,
        ),
        AttributeDecl::optional(
            "instance_template_reference",
            "Template the node's shape derives from",
            AttributeType::Object {
                attributes: vec![AttributeDecl::required(
                    "template_id",
                    "Instance template identifier",
                    AttributeType::String,
                )],
            },
        ),
        AttributeDecl::optional(
            "simple",
            "Single scalar value",
            AttributeType::Object {
                attributes: simple_value_attributes(),
            },
        ),
        AttributeDecl::optional(
            "simple_collection",
            "Ordered scalar values",
            AttributeType::List {
                element: Box::new(AttributeType::Object {
                    attributes: simple_value_attributes(),
                }),
            },
        ),
        AttributeDecl::optional(
            "choice",
            "Selected option with option-dependent children",
            AttributeType::Object {
                attributes: choice_attributes(depth, recurse),
            },
        ),
        AttributeDecl::optional(
            "choice_collection",
            "Ordered selected options, each with its own children",
            AttributeType::List {
                element: Box::new(AttributeType::Object {
                    attributes: choice_attributes(depth, recurse),
                }),
            },
        ),
        AttributeDecl::optional(
            "group_collection",
            "Ordered groups of child settings",
            AttributeType::List {
                element: Box::new(AttributeType::Object {
                    attributes: group_attributes(depth, recurse),
                }),
            },
        ),
    ]);
    attributes
}

fn simple_value_attributes() -> Vec<AttributeDecl> {
    vec![
        AttributeDecl::required(
            "value_type",
            "Scalar kind of the value",
            AttributeType::Enum {
                values: &["string", "integer", "secret"],
            },
        ),
        AttributeDecl::required("value", "Value, always written as a string", AttributeType::String),
        AttributeDecl::optional(
            "value_state",
            "State tag for secret values",
            AttributeType::Enum {
                values: &["invalid", "not_encrypted", "encrypted_value_token"],
            },
        ),
        value_template_attribute(),
    ]
}

fn choice_attributes(depth: u8, recurse: bool) -> Vec<AttributeDecl> {
    let mut attributes = vec![
        AttributeDecl::required("value", "Selected option", AttributeType::String),
        value_template_attribute(),
    ];
    attributes.extend(children_attribute(depth, recurse));
    attributes
}

fn group_attributes(depth: u8, recurse: bool) -> Vec<AttributeDecl> {
    let mut attributes = vec![value_template_attribute()];
    attributes.extend(children_attribute(depth, recurse));
    attributes
}

fn children_attribute(depth: u8, recurse: bool) -> Option<AttributeDecl> {
    recurse.then(|| {
        AttributeDecl::optional(
            "children",
            "Child settings",
            AttributeType::List {
                element: Box::new(AttributeType::Level { depth: depth + 1 }),
            },
        )
    })
}

fn value_template_attribute() -> AttributeDecl {
    AttributeDecl::optional(
        "value_template_reference",
        "Template the value derives from",
        AttributeType::Object {
            attributes: vec![
                AttributeDecl::required(
                    "template_id",
                    "Value template identifier",
                    AttributeType::String,
                ),
                AttributeDecl::optional(
                    "use_template_default",
                    "Use the template's default value",
                    AttributeType::Bool,
                ),
            ],
        },
    )
}

/// Errors raised when checking a configuration against a shape
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("shape declaration could not be compiled: {0}")]
    Compile(String),

    #[error("configuration could not be serialized for validation: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("configuration does not fit the depth-{bound} shape:\n  - {}", .violations.join("\n  - "))]
    Violations { bound: u8, violations: Vec<String> },
}

impl ShapeDecl {
    pub fn level(&self, depth: u8) -> Option<&LevelShape> {
        self.levels.iter().find(|l| l.depth == depth)
    }

    /// Number of declared attributes across all levels.
    ///
    /// A child-list reference counts once; the referenced level is counted
    /// where it is declared.
    pub fn node_count(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|l| l.attributes.iter())
            .map(AttributeDecl::count)
            .sum()
    }

    /// Render as a JSON Schema (draft 2020-12) with one `$defs` entry per level
    pub fn to_json_schema(&self) -> J {
        let defs: Map<String, J> = self
            .levels
            .iter()
            .map(|level| (level_def_name(level.depth), level_schema(level)))
            .collect();

        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "title": format!("Policy settings (depth {})", self.bound),
            "type": "object",
            "properties": {
                "settings": {
                    "type": "array",
                    "items": { "$ref": format!("#/$defs/{}", level_def_name(1)) }
                }
            },
            "additionalProperties": false,
            "$defs": defs,
        })
    }

    /// Check a serialized configuration against this shape
    pub fn validate(&self, instance: &J) -> Result<(), ShapeError> {
        let schema = self.to_json_schema();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft202012)
            .compile(&schema)
            .map_err(|e| ShapeError::Compile(e.to_string()))?;

        let violations: Vec<String> = match compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| format!("{}: {}", e.instance_path, e)).collect(),
        };

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ShapeError::Violations {
                bound: self.bound,
                violations,
            })
        }
    }

    /// Check a policy against this shape
    pub fn validate_policy(&self, policy: &Policy) -> Result<(), ShapeError> {
        let instance = serde_json::to_value(policy)?;
        self.validate(&instance)
    }
}

fn level_def_name(depth: u8) -> String {
    format!("level_{depth}")
}

fn level_schema(level: &LevelShape) -> J {
    let mut schema = object_schema(&level.attributes);
    if let J::Object(map) = &mut schema {
        let exactly_one_kind: Vec<J> = NODE_KINDS
            .iter()
            .map(|kind| json!({ "required": [kind] }))
            .collect();
        map.insert("oneOf".into(), J::Array(exactly_one_kind));
    }
    schema
}

fn object_schema(attributes: &[AttributeDecl]) -> J {
    let properties: Map<String, J> = attributes
        .iter()
        .map(|attr| {
            let mut property = type_schema(&attr.ty);
            if let J::Object(map) = &mut property {
                map.insert("description".into(), J::String(attr.description.into()));
            }
            (attr.name.to_string(), property)
        })
        .collect();
    let required: Vec<&str> = attributes.iter().filter(|a| a.required).map(|a| a.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn type_schema(ty: &AttributeType) -> J {
    match ty {
        AttributeType::String => json!({ "type": "string" }),
        AttributeType::Bool => json!({ "type": "boolean" }),
        AttributeType::Enum { values } => json!({ "type": "string", "enum": values }),
        AttributeType::Object { attributes } => object_schema(attributes),
        AttributeType::List { element } => json!({ "type": "array", "items": type_schema(element) }),
        AttributeType::Level { depth } => {
            json!({ "$ref": format!("#/$defs/{}", level_def_name(*depth)) })
        }
    }
}

/// Memoized shape declarations, one per bound
#[derive(Debug, Default)]
pub struct ShapeCache {
    shapes: Mutex<BTreeMap<u8, Arc<ShapeDecl>>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance for callers that do not inject their own
    pub fn global() -> &'static ShapeCache {
        static GLOBAL: OnceLock<ShapeCache> = OnceLock::new();
        GLOBAL.get_or_init(ShapeCache::new)
    }

    /// Shape for `bound`, built at most once per cache
    pub fn get_or_build(&self, bound: u8) -> Arc<ShapeDecl> {
        let bound = clamp_bound(bound);
        let mut shapes = self.shapes.lock().unwrap_or_else(PoisonError::into_inner);
        shapes.entry(bound).or_insert_with(|| Arc::new(build_shape(bound))).clone()
    }

    /// Resolve the bound and return the matching shape
    pub fn shape_for(
        &self,
        settings: &DepthSettings,
        estimator: &DepthEstimator,
    ) -> (ResolvedDepth, Arc<ShapeDecl>) {
        let resolved = resolve_depth(settings, estimator);
        (resolved, self.get_or_build(resolved.depth))
    }

    pub fn len(&self) -> usize {
        self.shapes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.shapes.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
