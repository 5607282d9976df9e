use crate::domain::ports::{ProcessorClient, ProcessorResponse};
use crate::error::{ConfigError, GatewayError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

/// Header carrying the gateway's static caller identifier.
pub const IDENTIFIER_HEADER: &str = "identifier";

/// Processor transport backed by `reqwest`.
///
/// Every HTTP status is returned as a [`ProcessorResponse`]; only connection,
/// timeout and body-read failures become [`GatewayError::Network`]. The static
/// `identifier` header is installed once as a default header.
#[derive(Debug, Clone)]
pub struct ReqwestProcessorClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestProcessorClient {
    /// Fails with [`ConfigError::Invalid`] when the identifier is not a valid
    /// header value or the client cannot be built.
    pub fn new(base_url: impl Into<String>, identifier: &str, timeout: Duration) -> Result<Self> {
        let identifier = HeaderValue::from_str(identifier).map_err(|e| {
            ConfigError::Invalid(format!("identifier is not a valid header value: {e}"))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(IDENTIFIER_HEADER, identifier);

        let client = reqwest::Client::builder()
            .user_agent(concat!("charge-gateway/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps a preconfigured client; it must already send the `identifier` header.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Network(format!("request timeout: {e}"))
    } else if e.is_connect() {
        GatewayError::Network(format!("connection failed: {e}"))
    } else {
        GatewayError::Network(format!("request failed: {e}"))
    }
}

#[async_trait]
impl ProcessorClient for ReqwestProcessorClient {
    async fn post(&self, endpoint: &str, payload: &[u8]) -> Result<ProcessorResponse> {
        let response = self
            .client
            .post(self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(format!("failed to read response body: {e}")))?;

        Ok(ProcessorResponse { status, body })
    }

    async fn health(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url("/healthcheck"))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Network(
                status
                    .canonical_reason()
                    .unwrap_or("processor health check failed")
                    .to_string(),
            ));
        }
        response
            .text()
            .await
            .map_err(|e| GatewayError::Network(format!("failed to read response body: {e}")))
    }
}
