mod files;
mod health;
mod share;
mod static_files;

use axum::http::{header, HeaderMap};

use crate::api::response::ApiError;
use crate::config::Config;
use crate::registry::models::{FileId, FileRecord};
use crate::AppState;

pub use files::{file_info, upload_file};
pub use health::health;
pub use share::share_page;
pub use static_files::serve_file;

/// Resolve a path segment to a registered record.
///
/// Malformed ids never reach the registry or the disk; both cases read as "not found".
fn lookup_record(state: &AppState, raw_id: &str) -> Result<FileRecord, ApiError> {
    let Some(id) = FileId::parse(raw_id) else {
        tracing::debug!(raw_id = %raw_id, "Rejected malformed file id");
        return Err(ApiError::not_found("File not found"));
    };

    state.registry.get(&id).ok_or_else(|| {
        tracing::debug!(file_id = %id, "Unknown file id");
        ApiError::not_found("File not found")
    })
}

/// Origin used for generated links: the configured base URL, else scheme and Host of the request.
fn request_origin(config: &Config, headers: &HeaderMap) -> String {
    if let Some(ref base) = config.sharing.public_base_url {
        return base.clone();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| *s == "https" || *s == "http")
        .unwrap_or("http");

    match headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
    {
        Some(host) => format!("{scheme}://{host}"),
        None => format!("{scheme}://localhost:{}", config.server.port),
    }
}

fn download_path(id: &FileId) -> String {
    format!("/download/{id}")
}

/// Share links point at the preview page when it is served, else straight at the bytes.
fn share_path(config: &Config, id: &FileId) -> String {
    if config.sharing.preview_page {
        format!("/share/{id}")
    } else {
        download_path(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_origin_from_host() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("pdf.local:3000"));
        assert_eq!(request_origin(&config, &headers), "http://pdf.local:3000");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(request_origin(&config, &headers), "https://pdf.local:3000");
    }

    #[test]
    fn test_request_origin_ignores_odd_scheme() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("pdf.local"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("javascript"));
        assert_eq!(request_origin(&config, &headers), "http://pdf.local");
    }

    #[test]
    fn test_request_origin_prefers_configured_base() {
        let mut config = Config::default();
        config.sharing.public_base_url = Some("https://share.example.com".to_string());
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:3000"));
        assert_eq!(request_origin(&config, &headers), "https://share.example.com");
    }

    #[test]
    fn test_request_origin_without_host() {
        let config = Config::default();
        assert_eq!(
            request_origin(&config, &HeaderMap::new()),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_share_path_follows_preview_toggle() {
        let id = FileId::generate();
        let mut config = Config::default();
        assert_eq!(share_path(&config, &id), format!("/share/{id}"));

        config.sharing.preview_page = false;
        assert_eq!(share_path(&config, &id), format!("/download/{id}"));
    }
}
