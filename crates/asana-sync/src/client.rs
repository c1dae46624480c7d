//! REST client for the Asana API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{ApiError, SyncError};

/// The one seam between sync logic and the network.
///
/// Implementations send a single authenticated call and return the unwrapped
/// `data` member of Asana's response envelope. No retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsanaApi: Send + Sync {
    /// Send `method path` with an optional JSON body.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError>;
}

/// Asana REST client
#[derive(Debug, Clone)]
pub struct AsanaClient {
    client: reqwest::Client,
    api_url: String,
}

impl AsanaClient {
    /// Create a client from validated configuration.
    ///
    /// # Errors
    /// Returns error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| SyncError::Config {
                missing: vec!["ASANA_PAT (not a valid header value)".to_string()],
            })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Transport)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Create a client against a custom API URL (mock servers).
    pub fn with_base_url(config: &Config, api_url: &str) -> Result<Self, SyncError> {
        let mut client = Self::new(config)?;
        client.api_url = api_url.trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl AsanaApi for AsanaClient {
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.api_url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(status = status.as_u16(), "Asana API responded");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parse_error = || ApiError::Parse {
            status: status.as_u16(),
            body: text.clone(),
        };
        let mut envelope: Value = serde_json::from_str(&text).map_err(|_| parse_error())?;
        envelope
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(parse_error)
    }
}

/// Deserialize an unwrapped `data` value, reporting shape mismatches as
/// [`ApiError::Parse`].
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(value.clone()).map_err(|e| ApiError::Parse {
        status: 200,
        body: format!("unexpected {what}: {e}: {value}"),
    })
}
