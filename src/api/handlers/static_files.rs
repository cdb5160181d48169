use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use super::lookup_record;
use crate::api::response::{ApiError, AppQuery};
use crate::object_store::ObjectStoreError;
use crate::registry::models::PDF_MIME;
use crate::AppState;

/// How the browser should treat the served PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    /// Render in the browser
    #[default]
    Inline,
    /// Save as
    Download,
}

#[derive(Debug, Deserialize)]
pub struct ServeFileParams {
    #[serde(default)]
    pub display: Display,
}

/// Stream a stored PDF back.
/// Route: GET /download/:id?display=inline|download
///
/// HEAD gets the same headers but no body and does not count as a download.
pub async fn serve_file(
    method: Method,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppQuery(params): AppQuery<ServeFileParams>,
) -> Result<Response, ApiError> {
    let file = lookup_record(&state, &id)?;

    let reader = state
        .object_store
        .open(&file.stored_filename)
        .await
        .map_err(|e| match e {
            ObjectStoreError::NotFound(_) => {
                tracing::warn!(file_id = %file.id, "Registered file is missing from storage");
                ApiError::not_found("File not found")
            }
            _ => ApiError::internal(format!("Failed to open file: {e}")),
        })?;

    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        let downloads = state
            .registry
            .record_download(&file.id)
            .ok_or_else(|| ApiError::not_found("File not found"))?;

        tracing::info!(
            file_id = %file.id,
            display = ?params.display,
            downloads,
            "Serving file"
        );

        // Headers go out before the body; a read error mid-stream aborts the connection.
        Body::from_stream(ReaderStream::new(reader.file))
    };

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PDF_MIME));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(reader.size));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(params.display, &file.original_name),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    // Every serve must reach us so the download counter stays honest.
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Ok(response)
}

/// Build a Content-Disposition naming the original file.
///
/// `filename` carries an ASCII fallback, `filename*` the exact UTF-8 name (RFC 6266).
fn content_disposition(display: Display, original_name: &str) -> HeaderValue {
    let kind = match display {
        Display::Inline => "inline",
        Display::Download => "attachment",
    };

    let fallback: String = original_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let value = format!(
        "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(original_name)
    );
    HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static(kind))
}
