// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Resolved configuration as seen by the commands

use anyhow::{Context, Result};
use sc_config_core::{load_all, paths, Resolved};
use sc_logging::CliLogLevel;
use sc_rest_client::{AuthConfig, RestClient};
use sc_settings_tree::{DepthSettings, DEFAULT_CONSTRAINED_DEPTH};
use std::path::Path;

/// Bearer token for the management service
pub const ACCESS_TOKEN_VAR: &str = "SC_ACCESS_TOKEN";

/// Parse a `KEY=VALUE` pair given to `--set`
pub fn parse_set(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Load every configuration layer for this invocation
pub fn load(config_file: Option<&Path>, sets: &[(String, String)]) -> Result<Resolved> {
    let paths = paths::discover_paths(config_file.map(Path::to_path_buf));
    let flags: Vec<(&str, &str)> = sets.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    load_all(&paths, &flags).context("loading configuration")
}

/// `log-level` from configuration, else `warn`
pub fn default_log_level(resolved: &Resolved) -> CliLogLevel {
    resolved
        .service()
        .ok()
        .and_then(|service| service.log_level)
        .and_then(|level| level.parse().ok())
        .unwrap_or_default()
}

/// Whether a `CI` variable value marks a constrained environment
pub fn ci_detected(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => !(v == "0" || v.eq_ignore_ascii_case("false")),
    }
}

/// Depth inputs from `[shape]` plus the `CI` environment variable
pub fn depth_settings(resolved: &Resolved) -> Result<DepthSettings> {
    let shape = resolved.shape()?;
    let ci = ci_detected(std::env::var("CI").ok().as_deref());
    Ok(DepthSettings {
        override_depth: shape.depth_override,
        constrained: shape.constrained.unwrap_or(false) || ci,
        constrained_depth: shape.constrained_depth.unwrap_or(DEFAULT_CONSTRAINED_DEPTH),
    })
}

/// REST client for the configured service
pub fn rest_client(resolved: &Resolved) -> Result<RestClient> {
    let service = resolved.service()?;
    let base_url = service
        .service_base_url
        .context("service-base-url is not configured")?;
    let auth = AuthConfig {
        bearer_token: std::env::var(ACCESS_TOKEN_VAR).ok().filter(|t| !t.is_empty()),
    };

    let mut client = RestClient::from_url(&base_url, auth)
        .with_context(|| format!("invalid service-base-url '{base_url}'"))?
        .with_api_version(service.api_version.unwrap_or_default().as_str());
    if let Some(page_size) = resolved.paging()?.page_size {
        client = client.with_page_size(page_size);
    }
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn resolved(json: serde_json::Value) -> Resolved {
        Resolved {
            json,
            provenance: Default::default(),
        }
    }

    #[test]
    fn set_pairs_split_on_first_equals() {
        assert_eq!(
            parse_set("service-base-url=https://x.example/?a=b").unwrap(),
            ("service-base-url".to_string(), "https://x.example/?a=b".to_string())
        );
        assert!(parse_set("no-equals").is_err());
        assert!(parse_set("=value").is_err());
    }

    #[test]
    fn ci_values() {
        assert!(!ci_detected(None));
        assert!(!ci_detected(Some("")));
        assert!(!ci_detected(Some("false")));
        assert!(!ci_detected(Some("0")));
        assert!(ci_detected(Some("true")));
        assert!(ci_detected(Some("1")));
    }

    #[test]
    #[serial]
    fn depth_settings_from_config() {
        std::env::remove_var("CI");
        let settings = depth_settings(&resolved(serde_json::json!({
            "shape": { "depth-override": 9, "constrained-depth": 3 }
        })))
        .unwrap();
        assert_eq!(settings.override_depth, Some(9));
        assert!(!settings.constrained);
        assert_eq!(settings.constrained_depth, 3);
    }

    #[test]
    #[serial]
    fn ci_variable_forces_constrained() {
        std::env::set_var("CI", "true");
        let settings = depth_settings(&resolved(serde_json::json!({})));
        std::env::remove_var("CI");
        let settings = settings.unwrap();
        assert!(settings.constrained);
        assert_eq!(settings.constrained_depth, DEFAULT_CONSTRAINED_DEPTH);
    }

    #[test]
    #[serial]
    fn rest_client_uses_configured_service() {
        std::env::remove_var(ACCESS_TOKEN_VAR);
        let client = rest_client(&resolved(serde_json::json!({
            "service-base-url": "https://graph.example",
            "api-version": "v1.0",
            "paging": { "page-size": 20 }
        })))
        .unwrap();
        assert_eq!(client.api_version(), "v1.0");
        assert_eq!(client.page_size(), 20);
        assert!(client.auth().is_anonymous());
    }

    #[test]
    fn rest_client_requires_base_url() {
        let err = rest_client(&resolved(serde_json::json!({}))).unwrap_err();
        assert!(err.to_string().contains("service-base-url"));
    }

    #[test]
    fn log_level_falls_back_to_warn() {
        assert_eq!(default_log_level(&resolved(serde_json::json!({}))), CliLogLevel::Warn);
        assert_eq!(
            default_log_level(&resolved(serde_json::json!({ "log-level": "debug" }))),
            CliLogLevel::Debug
        );
    }
}
