//! HTTP client for the back-office admin API

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use vysyamala_core::config::ApiConfig;
use vysyamala_core::types::string_or_number;

use crate::error::{DashboardError, DashboardResult};
use crate::query::QueryParams;

/// Endpoint listing the staff members who can own profiles
pub const PROFILE_OWNERS_PATH: &str = "api/users/";

/// The HTTP layer the dashboards talk through
///
/// Implemented by [`ApiClient`] for the real API; tests substitute
/// in-memory transports.
#[async_trait]
pub trait DashboardTransport: Send + Sync {
    /// GET `path` with `query` and parse the body as JSON
    async fn get_json(&self, path: &str, query: &QueryParams) -> DashboardResult<Value>;

    /// GET `path` with `query` and return the raw body
    async fn get_bytes(&self, path: &str, query: &QueryParams) -> DashboardResult<Bytes>;
}

/// API client for making HTTP requests to the admin API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Create a new API client with reqwest's default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
            api_key: None,
        }
    }

    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: &ApiConfig) -> DashboardResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let mut client = Self {
            client: builder.build()?,
            base_url: normalize_base_url(config.base_url.clone()),
            api_key: None,
        };
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            client = client.with_api_key(key);
        }
        Ok(client)
    }

    /// Set the API key for authentication
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base URL every endpoint path is appended to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint and query
    #[must_use]
    pub fn url_for(&self, path: &str, query: &QueryParams) -> String {
        let mut url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.to_query_string());
        }
        url
    }

    /// Staff members for the owner picker
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the list is malformed.
    pub async fn profile_owners(&self) -> DashboardResult<Vec<ProfileOwner>> {
        fetch_profile_owners(self).await
    }

    async fn send(&self, path: &str, query: &QueryParams) -> DashboardResult<reqwest::Response> {
        let url = self.url_for(path, query);
        debug!(%url, "GET");

        let mut request = self.client.get(&url);
        if let Some(ref api_key) = self.api_key {
            request = request.header("X-API-Key", api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DashboardError::Status {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DashboardTransport for ApiClient {
    async fn get_json(&self, path: &str, query: &QueryParams) -> DashboardResult<Value> {
        let response = self.send(path, query).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| DashboardError::decode(path, e.to_string()))
    }

    async fn get_bytes(&self, path: &str, query: &QueryParams) -> DashboardResult<Bytes> {
        let response = self.send(path, query).await?;
        Ok(response.bytes().await?)
    }
}

fn normalize_base_url(mut base_url: String) -> String {
    let trimmed = base_url.trim_end().len();
    base_url.truncate(trimmed);
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    base_url
}

/// Staff member who can be selected as a profile owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOwner {
    /// User id, used as the `owner` filter value
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub username: String,
}

/// Load the owner picker options
///
/// A body that is not a JSON array yields an empty list.
///
/// # Errors
///
/// Returns an error if the request fails or an array element is malformed.
pub async fn fetch_profile_owners<T>(transport: &T) -> DashboardResult<Vec<ProfileOwner>>
where
    T: DashboardTransport + ?Sized,
{
    let body = transport
        .get_json(PROFILE_OWNERS_PATH, &QueryParams::new())
        .await?;
    match body {
        Value::Array(_) => serde_json::from_value(body)
            .map_err(|e| DashboardError::decode(PROFILE_OWNERS_PATH, e.to_string())),
        _ => Ok(Vec::new()),
    }
}
