// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands print to stdout/stderr

//! Command implementations

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use sc_config_core::{loader, Resolved};
use sc_domain_types::Policy;
use sc_settings_tree::{
    build_shape, decode_policy, encode_policy, encode_policy_partial, DepthEstimator,
    ResolvedDepth, ShapeCache, ShapeDecl,
};
use serde_json::Value as J;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config;
use crate::policy_file::{read_policy_file, read_wire_file};

#[derive(Args, Debug)]
pub struct ShapeArgs {
    /// Depth bound; resolved from configuration and `--from` files when absent
    #[arg(long)]
    pub depth: Option<u8>,

    /// Policy files whose nesting feeds the depth estimate
    #[arg(long = "from", value_name = "FILE")]
    pub from: Vec<PathBuf>,

    /// Print the JSON Schema rendering instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl ShapeArgs {
    pub fn run(self, resolved: &Resolved) -> Result<()> {
        let shape = match self.depth {
            Some(depth) => Arc::new(build_shape(depth)),
            None => {
                for path in &self.from {
                    estimate_file(DepthEstimator::global(), path)?;
                }
                resolve_shape(resolved)?.1
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&shape.to_json_schema())?);
        } else {
            print_shape_summary(&shape);
        }
        Ok(())
    }
}

fn print_shape_summary(shape: &ShapeDecl) {
    println!("depth bound: {}", shape.bound);
    for level in &shape.levels {
        let names: Vec<&str> = level.attributes.iter().map(|a| a.name).collect();
        let children = if level.has_children() {
            format!(", children -> level {}", level.depth + 1)
        } else {
            String::new()
        };
        println!("level {}: {}{}", level.depth, names.join(" "), children);
    }
    println!("declared attributes: {}", shape.node_count());
}

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Configuration files to scan
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl EstimateArgs {
    pub fn run(self, resolved: &Resolved) -> Result<()> {
        let estimator = DepthEstimator::global();
        for path in &self.files {
            let depth = estimate_file(estimator, path)?;
            println!("{}: {}", path.display(), depth.map_or("-".into(), |d| d.to_string()));
        }
        let (bound, _) = resolve_shape(resolved)?;
        println!("resolved bound: {} ({})", bound.depth, bound.source);
        Ok(())
    }
}

/// Textual estimate for one file, recorded under its path
fn estimate_file(estimator: &DepthEstimator, path: &Path) -> Result<Option<u8>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let key = path.to_string_lossy();
    estimator.estimate(&key, &raw);
    Ok(estimator.depth_for(&key))
}

fn resolve_shape(resolved: &Resolved) -> Result<(ResolvedDepth, Arc<ShapeDecl>)> {
    let settings = config::depth_settings(resolved)?;
    let (bound, shape) = ShapeCache::global().shape_for(&settings, DepthEstimator::global());
    debug!(depth = bound.depth, source = %bound.source, "resolved shape depth");
    Ok((bound, shape))
}

/// Load a policy file and check it against the resolved shape
fn load_checked_policy(resolved: &Resolved, path: &Path) -> Result<Policy> {
    let file = read_policy_file(path)?;
    DepthEstimator::global().observe_policy(&path.to_string_lossy(), &file.policy);
    let (_, shape) = resolve_shape(resolved)?;
    shape
        .validate_policy(&file.policy)
        .with_context(|| format!("checking {:?} against the settings shape", path))?;
    Ok(file.policy)
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Policy file (JSON, or TOML by extension)
    pub file: PathBuf,

    /// Drop nodes that fail to convert instead of aborting
    #[arg(long)]
    pub partial: bool,
}

impl EncodeArgs {
    pub fn run(self, resolved: &Resolved) -> Result<()> {
        let policy = load_checked_policy(resolved, &self.file)?;
        let collection = if self.partial {
            let report = encode_policy_partial(&policy);
            for failure in &report.failures {
                eprintln!("dropped: {failure}");
            }
            report.collection
        } else {
            encode_policy(&policy)?
        };
        println!("{}", serde_json::to_string_pretty(&collection)?);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire settings file (`{"settings": [...]}` or a `{"value": [...]}` page)
    pub file: PathBuf,

    /// Print the decoded tree even when nodes had to be dropped
    #[arg(long)]
    pub allow_partial: bool,
}

impl DecodeArgs {
    pub fn run(self) -> Result<()> {
        let settings = read_wire_file(&self.file)?;
        let (policy, report) = decode_policy(&settings).into_parts();
        for failure in &report.failures {
            eprintln!("dropped: {failure}");
        }
        if !report.is_consistent() && !self.allow_partial {
            anyhow::bail!(
                "decoded {} of {} settings with {} failures; pass --allow-partial to print anyway",
                report.decoded_count,
                report.wire_count,
                report.failure_count()
            );
        }
        println!("{}", serde_json::to_string_pretty(&policy)?);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PullArgs {
    pub policy_id: String,

    /// Write the policy here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Keep the result even when nodes had to be dropped
    #[arg(long)]
    pub allow_partial: bool,
}

impl PullArgs {
    pub async fn run(self, resolved: &Resolved) -> Result<()> {
        let client = config::rest_client(resolved)?;
        let cancel = cancel_on_ctrl_c();
        let decoded = sc_rest_client::read_policy(&client, &self.policy_id, cancel)
            .await
            .with_context(|| format!("reading policy {}", self.policy_id))?;
        let (policy, report) = decoded.into_parts();

        if !report.is_consistent() {
            if !self.allow_partial {
                anyhow::bail!(
                    "policy {} read incompletely: {} of {} settings decoded, {} failures",
                    self.policy_id,
                    report.decoded_count,
                    report.wire_count,
                    report.failure_count()
                );
            }
            warn!(policy_id = %self.policy_id, "keeping partial policy");
        }

        let text = serde_json::to_string_pretty(&policy)?;
        match &self.output {
            Some(path) => {
                std::fs::write(path, text).with_context(|| format!("writing {:?}", path))?
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PushArgs {
    pub policy_id: String,

    /// Policy file (JSON, or TOML by extension)
    pub file: PathBuf,
}

impl PushArgs {
    pub async fn run(self, resolved: &Resolved) -> Result<()> {
        let policy = load_checked_policy(resolved, &self.file)?;
        let client = config::rest_client(resolved)?;
        let submitted = sc_rest_client::write_policy(&client, &self.policy_id, &policy)
            .await
            .with_context(|| format!("writing policy {}", self.policy_id))?;
        println!(
            "submitted {} settings to policy {}",
            submitted.settings.len(),
            self.policy_id
        );
        Ok(())
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration values
    Show {
        /// Only this dotted key
        key: Option<String>,
        /// Show the layer each value came from
        #[arg(long)]
        show_origin: bool,
    },
    /// Print the configuration JSON schema
    Schema,
}

impl ConfigCommands {
    pub fn run(self, resolved: &Resolved) -> Result<()> {
        match self {
            ConfigCommands::Show { key, show_origin } => {
                show_config(resolved, key.as_deref(), show_origin)
            }
            ConfigCommands::Schema => {
                println!("{}", serde_json::to_string_pretty(loader::config_schema())?);
                Ok(())
            }
        }
    }
}

fn show_config(resolved: &Resolved, key: Option<&str>, show_origin: bool) -> Result<()> {
    let Some(key) = key else {
        if show_origin {
            for (path, scope) in &resolved.provenance.winner {
                let value = get_nested_value(&resolved.json, path).unwrap_or(&J::Null);
                println!("{path}={value} (from {scope})");
            }
        } else {
            println!("{}", serde_json::to_string_pretty(&resolved.json)?);
        }
        return Ok(());
    };

    let value = get_nested_value(&resolved.json, key)
        .with_context(|| format!("configuration key '{key}' is not set"))?;
    match resolved.provenance.winner.get(key).filter(|_| show_origin) {
        Some(scope) => println!("{key}={value} (from {scope})"),
        None => println!("{key}={value}"),
    }
    Ok(())
}

fn get_nested_value<'a>(json: &'a J, dotted: &str) -> Option<&'a J> {
    dotted.split('.').try_fold(json, |cur, part| cur.get(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lookup() {
        let json = serde_json::json!({ "shape": { "depth-override": 6 } });
        assert_eq!(get_nested_value(&json, "shape.depth-override"), Some(&J::from(6)));
        assert_eq!(get_nested_value(&json, "shape.constrained"), None);
        assert_eq!(get_nested_value(&json, "paging.page-size"), None);
    }
}
