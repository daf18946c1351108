// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Nesting depth estimation with a shared, lock-guarded cache
//!
//! Shape declarations must be generated before any configuration is read, so
//! the bound they use has to be guessed from whatever raw configuration text
//! is available. The estimate only needs to be at least the true depth:
//! overestimating makes the declaration larger, underestimating rejects legal
//! configurations.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use regex::Regex;
use sc_domain_types::Policy;

/// Deepest nesting the remote platform accepts
pub const PLATFORM_MAX_DEPTH: u8 = 15;

/// Smallest bound ever reported for a configuration that was seen
pub const MIN_SAFE_DEPTH: u8 = 3;

/// The token sequence that opens a child list, in JSON, TOML or HCL spelling
fn child_list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r#"\bchildren"?\s*[:=]\s*\["#).expect("child list marker pattern is valid")
    })
}

/// Scan raw configuration text for nested child lists.
///
/// Every marker occurrence opens one level and every line whose first
/// non-blank character is `}` closes one. Returns the highest level reached,
/// or `None` when the text contains no marker at all. Balance is not
/// checked; the running level never drops below zero.
pub fn scan_nesting(raw: &str) -> Option<usize> {
    let marker = child_list_marker();
    let mut seen = false;
    let mut current = 0usize;
    let mut max = 0usize;

    for line in raw.lines() {
        if line.trim_start().starts_with('}') {
            current = current.saturating_sub(1);
        }
        let opened = marker.find_iter(line).count();
        if opened > 0 {
            seen = true;
            current += opened;
            max = max.max(current);
        }
    }

    seen.then_some(max)
}

/// Convert a count of nested child lists into a safe depth bound
pub fn safe_depth_for_nesting(nesting: Option<usize>) -> u8 {
    match nesting {
        None => MIN_SAFE_DEPTH,
        Some(n) => safe_depth_for_levels(n.saturating_add(1)),
    }
}

/// Clamp an exact level count into `MIN_SAFE_DEPTH..=PLATFORM_MAX_DEPTH`
pub fn safe_depth_for_levels(levels: usize) -> u8 {
    let capped = levels.min(usize::from(PLATFORM_MAX_DEPTH));
    u8::try_from(capped)
        .unwrap_or(PLATFORM_MAX_DEPTH)
        .max(MIN_SAFE_DEPTH)
}

#[derive(Debug, Default)]
struct DepthState {
    per_key: HashMap<String, u8>,
    max: u8,
}

/// Per-configuration depth cache plus the running maximum across all of them.
///
/// Safe to share between threads; every operation takes the internal lock
/// for the duration of a single update.
#[derive(Debug, Default)]
pub struct DepthEstimator {
    state: Mutex<DepthState>,
}

impl DepthEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance for callers that do not inject their own
    pub fn global() -> &'static DepthEstimator {
        static GLOBAL: OnceLock<DepthEstimator> = OnceLock::new();
        GLOBAL.get_or_init(DepthEstimator::new)
    }

    /// Estimate the depth used by `raw_config` and record it under `config_key`.
    ///
    /// Empty text leaves the cache untouched.
    pub fn estimate(&self, config_key: &str, raw_config: &str) {
        if raw_config.trim().is_empty() {
            return;
        }
        self.record(config_key, safe_depth_for_nesting(scan_nesting(raw_config)));
    }

    /// Record the exact depth of an already parsed policy under `config_key`.
    ///
    /// Uses the same floor and ceiling as [`DepthEstimator::estimate`]; an
    /// empty policy is ignored.
    pub fn observe_policy(&self, config_key: &str, policy: &Policy) {
        if policy.is_empty() {
            return;
        }
        self.record(config_key, safe_depth_for_levels(policy.max_depth()));
    }

    /// Largest safe depth recorded so far, or 0 if nothing was recorded
    pub fn resolved_depth(&self) -> u8 {
        self.lock().max
    }

    /// Most recent safe depth recorded for one configuration
    pub fn depth_for(&self, config_key: &str) -> Option<u8> {
        self.lock().per_key.get(config_key).copied()
    }

    /// Forget everything, including the running maximum
    pub fn reset(&self) {
        *self.lock() = DepthState::default();
    }

    fn record(&self, config_key: &str, depth: u8) {
        let mut state = self.lock();
        state.per_key.insert(config_key.to_string(), depth);
        state.max = state.max.max(depth);
    }

    fn lock(&self) -> MutexGuard<'_, DepthState> {
        // The state is always left consistent, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_domain_types::{ChoiceValue, PolicySetting, SettingNode, SimpleValue};

    fn nested_hcl(levels: usize) -> String {
        let mut text = String::from("setting_instance = {\n");
        for _ in 0..levels {
            text.push_str("  choice_setting_value = {\n    children = [\n      {\n");
        }
        for _ in 0..levels {
            text.push_str("      }\n    ]\n  }\n");
        }
        text.push_str("}\n");
        text
    }

    #[test]
    fn test_four_nested_markers_give_depth_five() {
        let raw = nested_hcl(4);
        assert_eq!(scan_nesting(&raw), Some(4));

        let estimator = DepthEstimator::new();
        estimator.estimate("policy.a", &raw);
        assert_eq!(estimator.resolved_depth(), 5);
        assert_eq!(estimator.depth_for("policy.a"), Some(5));
    }

    #[test]
    fn test_no_marker_uses_floor() {
        let estimator = DepthEstimator::new();
        estimator.estimate("flat", r#"{ "settings": [ { "definition_id": "a" } ] }"#);
        assert_eq!(estimator.resolved_depth(), MIN_SAFE_DEPTH);
    }

    #[test]
    fn test_shallow_nesting_uses_floor() {
        assert_eq!(safe_depth_for_nesting(Some(1)), MIN_SAFE_DEPTH);
        assert_eq!(safe_depth_for_nesting(Some(2)), MIN_SAFE_DEPTH);
        assert_eq!(safe_depth_for_nesting(Some(3)), 4);
    }

    #[test]
    fn test_deep_nesting_capped_at_platform_max() {
        let estimator = DepthEstimator::new();
        estimator.estimate("deep", &nested_hcl(40));
        assert_eq!(estimator.resolved_depth(), PLATFORM_MAX_DEPTH);
    }

    #[test]
    fn test_empty_text_is_noop() {
        let estimator = DepthEstimator::new();
        estimator.estimate("empty", "");
        estimator.estimate("blank", "  \n\t\n");
        assert_eq!(estimator.resolved_depth(), 0);
        assert_eq!(estimator.depth_for("empty"), None);
    }

    #[test]
    fn test_unbalanced_markers_accepted() {
        let raw = "children = [\nchildren = [\nchildren = [\n";
        assert_eq!(scan_nesting(raw), Some(3));
    }

    #[test]
    fn test_closing_lines_never_go_negative() {
        let raw = "}\n}\n}\nchildren = [\n";
        assert_eq!(scan_nesting(raw), Some(1));
    }

    #[test]
    fn test_single_line_json_counts_each_marker() {
        let raw = r#"{"choice":{"value":"a","children":[{"choice":{"value":"b","children":[]}}]}}"#;
        assert_eq!(scan_nesting(raw), Some(2));
    }

    #[test]
    fn test_marker_requires_word_boundary() {
        assert_eq!(scan_nesting("grandchildren = [\n"), None);
    }

    #[test]
    fn test_shallower_config_does_not_lower_bound() {
        let estimator = DepthEstimator::new();
        estimator.estimate("deep", &nested_hcl(6));
        estimator.estimate("shallow", &nested_hcl(1));
        assert_eq!(estimator.resolved_depth(), 7);

        // Re-estimating the deep key with shallow text keeps the global maximum
        estimator.estimate("deep", &nested_hcl(1));
        assert_eq!(estimator.depth_for("deep"), Some(MIN_SAFE_DEPTH));
        assert_eq!(estimator.resolved_depth(), 7);
    }

    #[test]
    fn test_reset_clears_state() {
        let estimator = DepthEstimator::new();
        estimator.estimate("a", &nested_hcl(5));
        estimator.reset();
        assert_eq!(estimator.resolved_depth(), 0);
        assert_eq!(estimator.depth_for("a"), None);
    }

    #[test]
    fn test_observe_policy_uses_exact_depth() {
        let mut node = SettingNode::simple("leaf", SimpleValue::string("v"));
        for level in 0..5 {
            node = SettingNode::choice(
                format!("level_{level}"),
                ChoiceValue::new(format!("level_{level}_0")).with_children(vec![node]),
            );
        }
        let policy = Policy::new(vec![PolicySetting::new(node)]);

        let estimator = DepthEstimator::new();
        estimator.observe_policy("structured", &policy);
        assert_eq!(estimator.resolved_depth(), 6);

        estimator.observe_policy("empty", &Policy::default());
        assert_eq!(estimator.depth_for("empty"), None);
    }

    #[test]
    fn test_concurrent_estimates_keep_maximum() {
        let estimator = std::sync::Arc::new(DepthEstimator::new());
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let estimator = estimator.clone();
                std::thread::spawn(move || {
                    estimator.estimate(&format!("policy-{n}"), &nested_hcl(n));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(estimator.resolved_depth(), 9);
    }
}
