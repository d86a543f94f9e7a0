// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thin request-execution wrapper installing the decode pipeline.
//!
//! Every response flowing through a [`RelayClient`] is inspected: error
//! series statuses are consumed by the [`ErrorDecoder`] and surface as
//! [`ClientError`], everything else is handed back untouched. Transport
//! failures (connect errors, timeouts) bypass the pipeline and surface as
//! [`ClientError::Transport`].

use crate::decoder::ErrorDecoder;
use crate::error::ClientError;
use crate::registry::CauseRegistry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A `reqwest::Client` with the error-decoding strategy installed as the
/// default for every call.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    decoder: ErrorDecoder,
}

impl RelayClient {
    /// Client over a default `reqwest::Client`.
    pub fn new(registry: Arc<CauseRegistry>) -> Self {
        Self::with_http(reqwest::Client::new(), registry)
    }

    /// Client over a caller-configured `reqwest::Client` (timeouts, proxies
    /// and the like stay the transport's business).
    pub fn with_http(http: reqwest::Client, registry: Arc<CauseRegistry>) -> Self {
        Self {
            http,
            decoder: ErrorDecoder::new(registry),
        }
    }

    /// Execute a prepared request and run the response through the decode
    /// pipeline.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, ClientError> {
        let response = self.http.execute(request).await?;
        self.check(response).await
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.http.get(url).send().await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and decode a JSON reply.
    pub async fn post_json<T, B>(&self, url: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.http.post(url).json(body).send().await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    /// Pass non-error responses through; feed error responses to the
    /// decoder, which always raises.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if ErrorDecoder::is_error_status(status) {
            let body = response.bytes().await?;
            return Err(self.decoder.decode(status, &body));
        }
        Ok(response)
    }
}
