use std::net::SocketAddr;

/// Process-wide configuration, loaded once at startup and never mutated.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// CORS allow-list; a single `"*"` entry means any origin.
    pub allowed_origins: Vec<String>,
    /// Upstream extraction-service URL. Absence is a per-request failure,
    /// not a startup failure.
    pub extractor_endpoint: Option<String>,
    pub extractor_api_key: Option<String>,
    pub extractor_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("allowed_origins", &self.allowed_origins)
            .field("extractor_endpoint", &self.extractor_endpoint)
            .field(
                "extractor_api_key",
                &self.extractor_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("extractor_timeout_secs", &self.extractor_timeout_secs)
            .finish()
    }
}
