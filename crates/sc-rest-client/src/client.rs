// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main REST API client implementation

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, Response};
use sc_rest_api_contract::{ServiceErrorResponse, SettingsPage, WireSettingsCollection};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};
use crate::paging::{PolicySubmitter, SettingsPageSource};

/// API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "beta";

/// Largest page the service hands out
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// REST API client for the policy settings resource
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
    api_version: String,
    page_size: u32,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(base_url: Url, auth: AuthConfig) -> RestClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("settings-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            auth,
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthConfig) -> RestClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Self::new(base_url, auth)
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Page size requested on the first page; later pages follow the
    /// service's continuation link as given
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch one page of a policy's settings.
    ///
    /// Without a continuation link this is the first page; otherwise the link
    /// from the previous page is requested verbatim.
    pub async fn fetch_settings_page(
        &self,
        policy_id: &str,
        continuation: Option<&str>,
    ) -> RestClientResult<SettingsPage> {
        let url = match continuation {
            Some(link) => self.continuation_url(link)?.to_string(),
            None => {
                let mut url = self.policy_url(policy_id, true)?;
                url.query_pairs_mut().append_pair("$top", &self.page_size.to_string());
                url.to_string()
            }
        };
        self.get(&url).await
    }

    /// Resolve a continuation link; one that leaves the service origin is
    /// refused so the bearer token never reaches another host
    fn continuation_url(&self, link: &str) -> RestClientResult<Url> {
        let url = self.base_url.join(link)?;
        if url.origin() != self.base_url.origin() {
            return Err(RestClientError::UnexpectedResponse(format!(
                "continuation link {url} leaves {}",
                self.base_url.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }

    /// Replace a policy's settings with `settings`
    pub async fn submit_policy(
        &self,
        policy_id: &str,
        settings: &WireSettingsCollection,
    ) -> RestClientResult<()> {
        let url = self.policy_url(policy_id, false)?;
        self.send(Method::PUT, url.as_str(), Some(settings)).await?;
        Ok(())
    }

    /// `{base}/{version}/deviceManagement/configurationPolicies/{id}[/settings]`
    pub fn policy_url(&self, policy_id: &str, settings: bool) -> RestClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().push(&self.api_version).extend([
                "deviceManagement",
                "configurationPolicies",
                policy_id,
            ]);
            if settings {
                segments.push("settings");
            }
        }
        Ok(url)
    }

    // Private helper methods

    async fn get<T: DeserializeOwned>(&self, path: &str) -> RestClientResult<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> RestClientResult<T> {
        let response = self.send(method, path, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(RestClientError::from)
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> RestClientResult<Response> {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            self.base_url.join(path)?.to_string()
        };
        debug!(%method, %url, "sending request");

        let mut request = self.http_client.request(method, &url);

        let auth_headers = self.auth.headers().map_err(|e| RestClientError::Auth(e.to_string()))?;
        request = request.headers(auth_headers);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> RestClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        match serde_json::from_str::<ServiceErrorResponse>(&text) {
            Ok(body) => Err(RestClientError::ServerError {
                status,
                error: body.error,
            }),
            Err(_) => Err(RestClientError::UnexpectedResponse(format!("{status}: {text}"))),
        }
    }
}

#[async_trait]
impl SettingsPageSource for RestClient {
    async fn fetch_settings_page(
        &self,
        policy_id: &str,
        continuation: Option<&str>,
    ) -> RestClientResult<SettingsPage> {
        RestClient::fetch_settings_page(self, policy_id, continuation).await
    }
}

#[async_trait]
impl PolicySubmitter for RestClient {
    async fn submit_policy(
        &self,
        policy_id: &str,
        settings: &WireSettingsCollection,
    ) -> RestClientResult<()> {
        RestClient::submit_policy(self, policy_id, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = RestClient::from_url("https://graph.example.com", AuthConfig::default())
            .unwrap()
            .with_page_size(0);
        assert_eq!(client.base_url().as_str(), "https://graph.example.com/");
        assert_eq!(client.api_version(), DEFAULT_API_VERSION);
        assert_eq!(client.page_size(), 1);
        assert!(client.auth().is_anonymous());
    }

    #[test]
    fn test_policy_url_layout() {
        let client = RestClient::from_url("https://graph.example.com", AuthConfig::default())
            .unwrap()
            .with_api_version("v1.0");
        assert_eq!(
            client.policy_url("abc", true).unwrap().as_str(),
            "https://graph.example.com/v1.0/deviceManagement/configurationPolicies/abc/settings"
        );
        assert_eq!(
            client.policy_url("abc", false).unwrap().as_str(),
            "https://graph.example.com/v1.0/deviceManagement/configurationPolicies/abc"
        );
    }

    #[test]
    fn test_policy_url_keeps_base_path_and_escapes_id() {
        let client =
            RestClient::from_url("http://127.0.0.1:8080/proxy/", AuthConfig::default()).unwrap();
        assert_eq!(
            client.policy_url("a b/c", true).unwrap().as_str(),
            "http://127.0.0.1:8080/proxy/beta/deviceManagement/configurationPolicies/a%20b%2Fc/settings"
        );
    }

    #[test]
    fn test_continuation_must_stay_on_service_origin() {
        let client =
            RestClient::from_url("https://graph.example.com", AuthConfig::bearer("t")).unwrap();
        assert_eq!(
            client
                .continuation_url("https://graph.example.com/beta/x?$skiptoken=1")
                .unwrap()
                .as_str(),
            "https://graph.example.com/beta/x?$skiptoken=1"
        );
        assert_eq!(
            client.continuation_url("/beta/x?page=2").unwrap().as_str(),
            "https://graph.example.com/beta/x?page=2"
        );
        for foreign in [
            "https://attacker.example/beta/x",
            "http://graph.example.com/beta/x",
            "https://graph.example.com:8443/beta/x",
        ] {
            assert!(matches!(
                client.continuation_url(foreign),
                Err(RestClientError::UnexpectedResponse(_))
            ));
        }
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RestClient::from_url("not a url", AuthConfig::default()),
            Err(RestClientError::Url(_))
        ));
    }
}
