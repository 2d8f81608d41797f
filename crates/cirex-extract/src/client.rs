//! HTTP client for the upstream document-extraction service.
//!
//! Wraps `reqwest` with the relay's error taxonomy: transport failures and
//! non-success statuses surface as [`ExtractError::Http`], successful calls
//! with unreconcilable payloads as [`ExtractError::MalformedResponse`].
//! One POST per extraction — no retries, no polling.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ExtractError;
use crate::normalize;
use crate::types::{ExtractionRequest, ExtractionResult};

/// Client for the extraction-service endpoint.
///
/// Holds the HTTP client, the configured endpoint URL, and the optional
/// bearer token forwarded with every request. Use [`ExtractClient::new`]
/// in production or point the endpoint at a mock server in tests.
pub struct ExtractClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl ExtractClient {
    /// Creates a client for the given endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ExtractError::InvalidEndpoint`] if
    /// `endpoint` is not a valid URL.
    pub fn new(
        endpoint: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cirex/0.1 (invoice-extraction-relay)")
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| ExtractError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.map(ToOwned::to_owned),
        })
    }

    /// The configured endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Forwards an extraction request and normalizes the response into the
    /// canonical line-item shape.
    ///
    /// The bearer token is attached only when one was configured.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Http`] on network failure or non-2xx status.
    /// - [`ExtractError::Deserialize`] if the body is not valid JSON.
    /// - [`ExtractError::MalformedResponse`] if the payload holds no
    ///   recognizable line-item sequence.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractError> {
        tracing::debug!(
            document_chars = request.document.len(),
            document_type = %request.document_type,
            "forwarding document to extraction service"
        );

        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let raw: Value = serde_json::from_str(&body).map_err(|e| ExtractError::Deserialize {
            context: self.endpoint.to_string(),
            source: e,
        })?;

        let result = normalize::into_extraction_result(normalize::normalize(&raw)?)?;
        tracing::debug!(
            items = result.line_items.len(),
            "extraction response normalized"
        );
        Ok(result)
    }
}
