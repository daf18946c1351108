// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Whole-policy read and write on top of the page collector and tree codec

use sc_domain_types::Policy;
use sc_rest_api_contract::{ValueKind, WireScalar, WireSettingInstance, WireSettingsCollection};
use sc_settings_tree::{decode_policy, encode_policy, Decoded};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::RestClientResult;
use crate::paging::{PageCollector, PolicySubmitter, SettingsPageSource};

/// Read every page of a policy and decode it.
///
/// Nodes the decoder had to drop are logged one by one, and an incomplete
/// read is flagged again as a whole. The returned report carries the same
/// information for callers that must refuse to act on a partial tree.
pub async fn read_policy<S: SettingsPageSource + ?Sized>(
    source: &S,
    policy_id: &str,
    cancel: CancellationToken,
) -> RestClientResult<Decoded<Policy>> {
    let items = PageCollector::new(source, policy_id)
        .with_cancellation(cancel)
        .collect_all()
        .await?;

    let decoded = decode_policy(&items);
    let report = &decoded.report;
    for failure in &report.failures {
        warn!(policy_id, definition_id = failure.definition_id(), error = %failure, "dropped setting node");
    }
    if report.is_consistent() {
        debug!(policy_id, settings = report.decoded_count, "policy read complete");
    } else {
        warn!(
            policy_id,
            wire_count = report.wire_count,
            decoded_count = report.decoded_count,
            failures = report.failure_count(),
            "policy read is incomplete; decoded tree does not match remote state"
        );
    }
    Ok(decoded)
}

/// Encode a policy and submit it.
///
/// Encoding is strict: a single conversion failure aborts the write before
/// anything is sent.
pub async fn write_policy<P: PolicySubmitter + ?Sized>(
    submitter: &P,
    policy_id: &str,
    policy: &Policy,
) -> RestClientResult<WireSettingsCollection> {
    let settings = encode_policy(policy)?;
    trace!(policy_id, payload = %redacted_payload(&settings), "submitting settings");
    submitter.submit_policy(policy_id, &settings).await?;
    debug!(policy_id, settings = settings.settings.len(), "policy written");
    Ok(settings)
}

/// JSON rendering of a collection with secret values masked
pub fn redacted_payload(settings: &WireSettingsCollection) -> String {
    let mut settings = settings.clone();
    for setting in &mut settings.settings {
        redact_instance(&mut setting.setting_instance);
    }
    serde_json::to_string(&settings).unwrap_or_default()
}

fn redact_instance(instance: &mut WireSettingInstance) {
    let secret = Some(ValueKind::Secret.odata_type());
    let simple_values = instance
        .simple_setting_value
        .iter_mut()
        .chain(instance.simple_setting_collection_value.iter_mut().flatten());
    for value in simple_values {
        if value.odata_type.as_deref() != secret {
            continue;
        }
        if let Some(WireScalar::Text(text)) = value.value.as_mut() {
            *text = sc_logging::redact(&*text).to_string();
        }
    }

    let choice_children = instance
        .choice_setting_value
        .iter_mut()
        .chain(instance.choice_setting_collection_value.iter_mut().flatten())
        .filter_map(|c| c.children.as_mut());
    let group_children = instance
        .group_setting_collection_value
        .iter_mut()
        .flatten()
        .filter_map(|g| g.children.as_mut());
    for children in choice_children.chain(group_children) {
        children.iter_mut().for_each(redact_instance);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sc_domain_types::{
        ChoiceValue, PolicySetting, SecretValueState, SettingNode, SimpleValue, ValueType,
    };
    use sc_rest_api_contract::SettingsPage;
    use sc_settings_tree::TreeError;

    use super::*;
    use crate::error::RestClientError;

    #[derive(Default)]
    struct RecordingSubmitter {
        submitted: Mutex<Vec<(String, WireSettingsCollection)>>,
    }

    #[async_trait]
    impl PolicySubmitter for RecordingSubmitter {
        async fn submit_policy(
            &self,
            policy_id: &str,
            settings: &WireSettingsCollection,
        ) -> RestClientResult<()> {
            self.submitted
                .lock()
                .unwrap()
                .push((policy_id.to_string(), settings.clone()));
            Ok(())
        }
    }

    struct OnePage(WireSettingsCollection);

    #[async_trait]
    impl SettingsPageSource for OnePage {
        async fn fetch_settings_page(
            &self,
            _policy_id: &str,
            _continuation: Option<&str>,
        ) -> RestClientResult<SettingsPage> {
            Ok(SettingsPage {
                items: self.0.settings.clone(),
                next_link: None,
            })
        }
    }

    fn sample_policy() -> Policy {
        Policy::new(vec![
            PolicySetting::with_id(
                "0",
                SettingNode::choice(
                    "wifi",
                    ChoiceValue::new("wifi_1").with_children(vec![SettingNode::simple(
                        "wifi_key",
                        SimpleValue::secret("hunter2", SecretValueState::NotEncrypted),
                    )]),
                ),
            ),
            PolicySetting::with_id(
                "1",
                SettingNode::simple("retries", SimpleValue::integer(3)),
            ),
        ])
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let submitter = RecordingSubmitter::default();
        let policy = sample_policy();
        write_policy(&submitter, "p1", &policy).await.unwrap();

        let (policy_id, collection) = submitter.submitted.lock().unwrap().remove(0);
        assert_eq!(policy_id, "p1");

        let decoded = read_policy(&OnePage(collection), "p1", CancellationToken::new())
            .await
            .unwrap();
        assert!(decoded.report.is_consistent());
        assert_eq!(decoded.value, policy);
    }

    #[tokio::test]
    async fn test_conversion_error_blocks_write() {
        let submitter = RecordingSubmitter::default();
        let policy = Policy::new(vec![PolicySetting::new(SettingNode::simple(
            "retries",
            SimpleValue::new(ValueType::Integer, "three"),
        ))]);

        let err = write_policy(&submitter, "p1", &policy).await.unwrap_err();
        assert!(matches!(
            err,
            RestClientError::Encode(TreeError::Conversion { ref definition_id, .. }) if definition_id == "retries"
        ));
        assert!(err.to_string().contains("integer"));
        assert!(submitter.submitted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_redacted_payload_masks_nested_secrets() {
        let settings = encode_policy(&sample_policy()).unwrap();
        let rendered = redacted_payload(&settings);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("wifi_key"));
    }
}
