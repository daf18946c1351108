// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Paged collection of a policy's settings

use std::collections::HashSet;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use sc_rest_api_contract::{SettingsPage, WireSetting, WireSettingsCollection};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{RestClientError, RestClientResult};

/// Anything that can hand out the pages of a settings collection
#[async_trait]
pub trait SettingsPageSource: Send + Sync {
    async fn fetch_settings_page(
        &self,
        policy_id: &str,
        continuation: Option<&str>,
    ) -> RestClientResult<SettingsPage>;
}

/// Anything that accepts a complete settings collection for a policy
#[async_trait]
pub trait PolicySubmitter: Send + Sync {
    async fn submit_policy(
        &self,
        policy_id: &str,
        settings: &WireSettingsCollection,
    ) -> RestClientResult<()>;
}

/// Walks every page of one policy's settings in order.
///
/// Pages are fetched strictly one after another since each continuation
/// link comes from the previous response. Any failed fetch ends the walk
/// with that error; nothing collected so far is returned.
pub struct PageCollector<'a, S: SettingsPageSource + ?Sized> {
    source: &'a S,
    policy_id: String,
    cancel: CancellationToken,
}

impl<'a, S: SettingsPageSource + ?Sized> PageCollector<'a, S> {
    pub fn new(source: &'a S, policy_id: impl Into<String>) -> Self {
        Self {
            source,
            policy_id: policy_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between (or during) page fetches once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    /// Lazily yield settings page by page.
    ///
    /// Each call starts again from the first page.
    pub fn stream(&self) -> impl Stream<Item = RestClientResult<WireSetting>> + Send + '_ {
        async_stream::try_stream! {
            let mut continuation: Option<String> = None;
            let mut seen_links = HashSet::new();
            let mut pages = 0usize;

            loop {
                if self.cancel.is_cancelled() {
                    Err(RestClientError::Cancelled { pages })?;
                }

                let fetched = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    page = self.source.fetch_settings_page(&self.policy_id, continuation.as_deref()) => Some(page),
                };
                let page = match fetched {
                    Some(page) => page?,
                    None => Err(RestClientError::Cancelled { pages })?,
                };
                pages += 1;
                debug!(
                    policy_id = %self.policy_id,
                    page = pages,
                    items = page.items.len(),
                    more = page.next_link.is_some(),
                    "fetched settings page"
                );

                for item in page.items {
                    yield item;
                }

                match page.next_link {
                    Some(link) => {
                        if seen_links.contains(&link) {
                            Err(RestClientError::RepeatedContinuation { link, pages })?;
                        } else {
                            seen_links.insert(link.clone());
                            continuation = Some(link);
                        }
                    }
                    None => break,
                }
            }
        }
    }

    /// Fetch every page and return all settings in page order
    pub async fn collect_all(&self) -> RestClientResult<Vec<WireSetting>> {
        self.stream().try_collect().await
    }
}
