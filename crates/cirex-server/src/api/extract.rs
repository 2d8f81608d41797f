//! Extraction intake: multipart PDF upload and base64 JSON, both funneled
//! into one forwarding path.

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use cirex_extract::{ExtractError, ExtractionRequest, ExtractionResult};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// Hard cap on the decoded document, matching the upstream service's limit.
const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field names accepted for the uploaded document.
const DOCUMENT_FIELDS: &[&str] = &["document", "file"];

/// `POST /api/extract` — multipart PDF upload.
///
/// Validates content type, size, and PDF magic bytes, then base64-encodes
/// the payload and forwards it upstream with default extraction parameters.
pub async fn extract_upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResult>, ApiError> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("malformed multipart body: {e}"),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if !DOCUMENT_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let content_type = field.content_type().map(ToOwned::to_owned);
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::new(
                req_id.0.clone(),
                "bad_request",
                format!("failed to read uploaded file: {e}"),
            )
        })?;
        upload = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let Some((file_name, content_type, bytes)) = upload else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "no PDF file provided; upload a 'document' field or POST base64 JSON to /api/extract/base64",
        ));
    };

    if let Some(content_type) = content_type {
        if content_type != "application/pdf" {
            return Err(ApiError::new(
                req_id.0,
                "bad_request",
                format!("only PDF files are allowed, got {content_type}"),
            ));
        }
    }

    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "file size exceeds 10MB limit",
        ));
    }

    if !bytes.starts_with(b"%PDF") {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "the uploaded file does not appear to be a valid PDF",
        ));
    }

    tracing::info!(
        file = %file_name,
        bytes = bytes.len(),
        "extraction request received: file upload"
    );

    let request = ExtractionRequest::new(BASE64.encode(&bytes));
    run_extraction(&state, req_id.0, &request).await
}

/// `POST /api/extract/base64` — JSON body with a base64-encoded document
/// and optional extraction parameters.
pub async fn extract_base64(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(mut request): Json<ExtractionRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    if request.document.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "document (base64) is required",
        ));
    }

    request.document = strip_data_url_prefix(request.document);

    tracing::info!("extraction request received: base64 document");
    run_extraction(&state, req_id.0, &request).await
}

/// Drops a `data:application/pdf;base64,` style prefix so callers may send
/// data URLs directly.
fn strip_data_url_prefix(document: String) -> String {
    match document.find(',') {
        Some(idx) => document[idx + 1..].to_string(),
        None => document,
    }
}

async fn run_extraction(
    state: &AppState,
    request_id: String,
    request: &ExtractionRequest,
) -> Result<Json<ExtractionResult>, ApiError> {
    let Some(client) = &state.extractor else {
        return Err(ApiError::new(
            request_id,
            "not_configured",
            "CIREX_EXTRACTOR_ENDPOINT not configured; set the environment variable",
        ));
    };

    match client.extract(request).await {
        Ok(result) => {
            tracing::info!(
                items = result.line_items.len(),
                "extraction successful"
            );
            Ok(Json(result))
        }
        Err(error) => Err(map_extract_error(request_id, &error)),
    }
}

fn map_extract_error(request_id: String, error: &ExtractError) -> ApiError {
    tracing::error!(error = %error, "extraction failed");
    match error {
        ExtractError::Http(_)
        | ExtractError::MalformedResponse(_)
        | ExtractError::Deserialize { .. } => {
            ApiError::new(request_id, "bad_gateway", error.to_string())
        }
        ExtractError::InvalidEndpoint { .. } => {
            ApiError::new(request_id, "not_configured", error.to_string())
        }
    }
}
