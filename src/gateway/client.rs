use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Per-call knobs layered over the client defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub no_cache: bool,
}

impl RequestOptions {
    pub fn no_cache() -> Self {
        Self {
            timeout: None,
            no_cache: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// JSON client bound to one base URL. Carries no business logic and never
/// retries; every failure is classified into an [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: &RequestOptions,
    ) -> Result<T, ApiError> {
        let body = self.send(self.client.get(self.url(path)), opts).await?;
        parse_body(&body)
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        payload: &B,
        opts: &RequestOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = self
            .send(self.client.post(self.url(path)).json(payload), opts)
            .await?;
        parse_body(&body)
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        payload: &B,
        opts: &RequestOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = self
            .send(self.client.put(self.url(path)).json(payload), opts)
            .await?;
        parse_body(&body)
    }

    pub async fn delete(&self, path: &str, opts: &RequestOptions) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(path)), opts).await?;
        Ok(())
    }

    async fn send(
        &self,
        mut request: RequestBuilder,
        opts: &RequestOptions,
    ) -> Result<String, ApiError> {
        if let Some(timeout) = opts.timeout {
            request = request.timeout(timeout);
        }
        if opts.no_cache {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!("Backend error {} for {}: {}", status, url, body);
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        debug!("Backend {} for {} ({} bytes)", status, url, body.len());
        Ok(body)
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse: {}", e);
        ApiError::MalformedResponse(e.to_string())
    })
}
