use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use super::{download_path, lookup_record};
use crate::registry::models::FileRecord;
use crate::AppState;

const NOT_FOUND_PAGE: &str = "<!doctype html>\n<html><head><meta charset=\"utf-8\">\
<title>File not found</title></head><body><h1>File not found</h1>\
<p>This link is invalid or the file is no longer available.</p></body></html>\n";

/// Landing page for a share link.
/// Route: GET /share/:id
pub async fn share_page(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let file = match lookup_record(&state, &id) {
        Ok(file) => file,
        Err(_) => return not_found(),
    };

    match state.object_store.exists(&file.stored_filename).await {
        Ok(true) => Html(render(&file)).into_response(),
        Ok(false) => {
            tracing::warn!(file_id = %file.id, "Registered file is missing from storage");
            not_found()
        }
        Err(e) => {
            tracing::error!(file_id = %file.id, error = %e, "Failed to check stored file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<!doctype html>\n<h1>Something went wrong</h1>\n"),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
}

fn render(file: &FileRecord) -> String {
    let name = escape_html(&file.original_name);
    let href = download_path(&file.id);
    let size_kb = file.size.div_ceil(1024);
    let uploaded = file.upload_time.format("%Y-%m-%d %H:%M UTC");

    format!(
        "<!doctype html>
<html>
<head>
<meta charset=\"utf-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
<title>{name}</title>
</head>
<body>
<main>
<h1>{name}</h1>
<p>{size_kb} KB &middot; uploaded {uploaded}</p>
<p>
<a href=\"{href}?display=inline\" target=\"_blank\" rel=\"noopener\">Open</a>
<a href=\"{href}?display=download\">Download</a>
</p>
</main>
</body>
</html>
"
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
