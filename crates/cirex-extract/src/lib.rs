//! Client for the upstream document-extraction service plus the response
//! normalizer that reconciles its loosely-structured payloads into the
//! canonical line-item schema.
//!
//! The service itself performs all document intelligence; this crate only
//! forwards a base64-encoded PDF and repairs what comes back.

mod client;
mod error;
pub mod normalize;
mod types;

pub use client::ExtractClient;
pub use error::ExtractError;
pub use types::{default_extract_fields, ExtractionRequest, ExtractionResult, LineItem};
