//! The four verb helpers: `get`, `post`, `put`, `del`.
//!
//! # Design
//! `Api` pairs an `ApiClient` with a `Transport`. Each helper builds one
//! request, hands it to the transport once and parses whatever comes back.
//! There is no retry loop and no cache anywhere on this path; the only
//! shared state is the immutable base URL, so calls may run concurrently
//! through `&self`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug, Clone)]
pub struct Api<T = ReqwestTransport> {
    client: ApiClient,
    transport: T,
}

impl Api<ReqwestTransport> {
    /// Build from `API_BASE` (or `.env`), falling back to the default base.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_config(&ApiConfig::from_env())
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(
            ApiClient::from_config(config),
            ReqwestTransport::new()?,
        ))
    }

    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::from_config(&ApiConfig::new(base_url))
    }
}

impl<T: Transport> Api<T> {
    pub fn with_transport(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn get<R, P>(&self, path: &str, params: Option<&P>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self.client.build_get(path, params)?;
        self.send(request).await
    }

    pub async fn post<R, B>(&self, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.build_post(path, body)?;
        self.send(request).await
    }

    pub async fn put<R, B>(&self, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.build_put(path, body)?;
        self.send(request).await
    }

    pub async fn del<R>(&self, path: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let request = self.client.build_delete(path);
        self.send(request).await
    }

    async fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, "received response");
        self.client.parse(response)
    }
}
