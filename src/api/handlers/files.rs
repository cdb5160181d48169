use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::BytesMut;
use serde::Serialize;
use std::sync::Arc;

use super::{download_path, lookup_record, request_origin, share_path};
use crate::api::response::{ApiError, Success};
use crate::object_store::ObjectStoreError;
use crate::registry::models::{FileId, FileRecord, PDF_MIME};
use crate::AppState;

/// Multipart field carrying the upload.
const UPLOAD_FIELD: &str = "pdf";
const FALLBACK_NAME: &str = "document.pdf";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub share_url: String,
    pub download_url: String,
    pub original_name: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    pub id: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    pub size_label: String,
    pub upload_time: String,
    pub stored_at: Option<String>,
    pub download_count: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Success<UploadResponse>>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::bad_request(format!("Expected a multipart upload: {e}")))?;
    let max_size = state.config.max_upload_size;
    let mut upload: Option<(String, BytesMut)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if !is_pdf(field.content_type()) {
            return Err(ApiError::bad_request("Only PDF files are allowed"));
        }

        let original_name = field
            .file_name()
            .and_then(display_name)
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_size))?
        {
            if (data.len() + chunk.len()) as u64 > max_size {
                return Err(too_large(max_size));
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((original_name, data));
        break;
    }

    let (original_name, data) = upload
        .filter(|(_, data)| !data.is_empty())
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let id = FileId::generate();
    let size = data.len() as u64;

    // The record is only registered once the bytes are on disk.
    state
        .object_store
        .put(&id.stored_filename(), data.freeze())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;

    let record = FileRecord::new(id.clone(), original_name, size);
    state
        .registry
        .insert(record.clone())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(file_id = %id, size, original_name = %record.original_name, "Stored upload");

    let origin = request_origin(&state.config, &headers);
    Ok(Success::json(UploadResponse {
        file_id: id.to_string(),
        filename: record.stored_filename,
        share_url: format!("{origin}{}", share_path(&state.config, &id)),
        download_url: format!("{origin}{}", download_path(&id)),
        original_name: record.original_name,
        size,
    }))
}

pub async fn file_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Success<FileInfoResponse>>, ApiError> {
    let record = lookup_record(&state, &id)?;

    let meta = state
        .object_store
        .stat(&record.stored_filename)
        .await
        .map_err(|e| match e {
            ObjectStoreError::NotFound(_) => {
                tracing::warn!(file_id = %record.id, "Registered file is missing from storage");
                ApiError::not_found("File not found")
            }
            _ => ApiError::internal(format!("Failed to read file metadata: {e}")),
        })?;

    Ok(Success::json(FileInfoResponse {
        id: record.id.to_string(),
        original_name: record.original_name,
        mimetype: record.mimetype,
        size: meta.size,
        size_label: size_label(meta.size),
        upload_time: record.upload_time.to_rfc3339(),
        stored_at: meta.created_at.map(|t| t.to_rfc3339()),
        download_count: record.download_count,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn too_large(max_size: u64) -> ApiError {
    ApiError::payload_too_large(format!(
        "File exceeds maximum upload size of {max_size} bytes"
    ))
}

fn multipart_error(e: MultipartError, max_size: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_size)
    } else {
        ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
    }
}

/// Compare the media type only, ignoring parameters and case.
fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME))
}

/// Strip any client path and control characters from a supplied filename.
fn display_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn size_label(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
