use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::types::BackendConfig;

use super::error::BackendError;

/// JSON client for the task backend.
///
/// Holds nothing but the base URL and a pooled `reqwest::Client`; cloning is
/// cheap and every request is independent of the others.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(concat!("orchestra-bridge/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self {
            base_url: config.base_url().to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}{path}` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("backend: GET {url}");
        self.execute(self.http.get(url)).await
    }

    /// `POST {base}{path}` with a JSON body and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!("backend: POST {url}");
        self.execute(self.http.post(url).json(body)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await.map_err(BackendError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(status));
        }
        response.json::<T>().await.map_err(BackendError::Decode)
    }
}

/// Percent-encode a slug for use as a single path segment.
pub fn segment(slug: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(slug)
}
