//! Page loader module
//!
//! Serves the fixed control page on the site root.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

/// Serve the configured HTML page on `GET /`.
///
/// A failed read answers 500 instead of leaving the connection open;
/// the cause goes to the error log.
pub async fn serve_page(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match fs::read(&state.config.page.file).await {
        Ok(content) => http::response::build_page_response(content, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read page file '{}': {e}",
                state.config.page.file
            ));
            http::build_500_response()
        }
    }
}
