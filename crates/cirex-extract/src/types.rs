//! Request and response types shared between the HTTP layer and the
//! extraction-service client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload forwarded to the extraction service, and the accepted shape of
/// the JSON intake endpoint. Every field except `document` has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Base64-encoded PDF document.
    pub document: String,
    #[serde(default = "default_document_type")]
    pub document_type: String,
    #[serde(default = "default_extract_fields")]
    pub extract_fields: Vec<String>,
    #[serde(default = "default_format")]
    pub format: String,
}

impl ExtractionRequest {
    /// Builds a request for `document` with the default extraction parameters.
    #[must_use]
    pub fn new(document: String) -> Self {
        Self {
            document,
            document_type: default_document_type(),
            extract_fields: default_extract_fields(),
            format: default_format(),
        }
    }
}

fn default_document_type() -> String {
    "commercial_invoice".to_string()
}

fn default_format() -> String {
    "line_items".to_string()
}

/// The field list requested from the extraction service when the caller does
/// not supply one.
#[must_use]
pub fn default_extract_fields() -> Vec<String> {
    [
        "line_items",
        "sku",
        "description",
        "hts_code",
        "country_of_origin",
        "quantity",
        "unit_price",
        "total_value",
        "weight",
        "unit_of_measure",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// One extracted invoice line in canonical form.
///
/// Field defaults make any repaired JSON object deserializable; the
/// normalizer guarantees `sku` is populated before this type is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_not_available")]
    pub hts_code: String,
    #[serde(default = "default_not_available")]
    pub country_of_origin: String,
    #[serde(default)]
    pub package_count: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub net_weight: f64,
    #[serde(default)]
    pub gross_weight: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default = "default_unit_of_measure")]
    pub unit_of_measure: String,
}

fn default_not_available() -> String {
    "N/A".to_string()
}

fn default_unit_of_measure() -> String {
    "EA".to_string()
}

/// Canonical extraction outcome returned to callers.
///
/// `line_items` is always present (possibly empty only when `error` is set
/// by the upstream service); `metadata` and `error` are omitted from the
/// serialized form when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
