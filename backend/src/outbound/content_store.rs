//! Reqwest-backed content-addressed store adapter.
//!
//! This adapter owns transport details only: multipart upload, timeout and
//! HTTP error mapping, and decoding the store's add response. It speaks the
//! IPFS-style HTTP API: `POST /api/v0/add` to pin bytes, `POST /api/v0/cat`
//! to read them back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{ContentId, ContentStore, ContentStoreError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response body of `POST /api/v0/add`.
#[derive(Debug, Deserialize)]
struct AddResponseDto {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Content store adapter performing HTTP requests against one gateway.
pub struct HttpContentStore {
    client: Client,
    endpoint: Url,
    bearer_token: Option<String>,
}

impl HttpContentStore {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            bearer_token: None,
        })
    }

    /// Attach a bearer token sent with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn api_url(&self, path: &str) -> Result<Url, ContentStoreError> {
        self.endpoint
            .join(path)
            .map_err(|err| ContentStoreError::unreachable(format!("bad store url: {err}")))
    }

    fn authorise(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> ContentStoreError {
    ContentStoreError::unreachable(error.to_string())
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentId, ContentStoreError> {
        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(bytes.to_vec()).file_name("descriptor.json"),
        );
        let response = self
            .authorise(self.client.post(self.api_url("api/v0/add")?))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(ContentStoreError::unreachable(format!(
                "store add returned {status}"
            )));
        }

        let decoded: AddResponseDto = serde_json::from_slice(&body)
            .map_err(|err| ContentStoreError::decode(format!("invalid add response: {err}")))?;
        ContentId::new(decoded.hash)
            .map_err(|err| ContentStoreError::decode(format!("invalid issued id: {err}")))
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, ContentStoreError> {
        let response = self
            .authorise(self.client.post(self.api_url("api/v0/cat")?))
            .query(&[("arg", id.as_ref())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ContentStoreError::not_found(id.to_string()));
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(ContentStoreError::unreachable(format!(
                "store cat returned {status}"
            )));
        }
        Ok(body.to_vec())
    }
}
