use thiserror::Error;

/// Errors returned by the extraction-service client and normalizer.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Network/TLS failure, timeout, or non-success HTTP status from the
    /// upstream service.
    #[error("extraction service error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream call succeeded but the payload could not be reconciled
    /// into the canonical line-item shape.
    #[error("invalid extraction response: {0}")]
    MalformedResponse(String),

    /// The response body was not valid JSON at all.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured endpoint is not a usable URL. Raised at client
    /// construction, before any request is made.
    #[error("invalid extraction endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
