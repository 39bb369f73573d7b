//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, the fixed
//! route table, and access logging.

use crate::config::AppState;
use crate::handler::{page, static_files, submit};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Route for the control form submission
pub const SUBMIT_PATH: &str = "/hydrus_submit";

/// Request context for the read-only handlers
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    let referer = header_string(&req, "referer");
    let user_agent = header_string(&req, "user-agent");

    let access_log = state
        .cached_access_log
        .load(std::sync::atomic::Ordering::Relaxed);

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let response = if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        resp
    } else {
        dispatch(req, &method, &path, &state).await
    };

    if access_log {
        let mut entry = AccessLogEntry::new(peer_addr.to_string(), method.to_string(), path);
        entry.query = query;
        entry.http_version = http_version;
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch to a handler based on method and path.
///
/// Route table, in order: `GET /` goes to the page loader,
/// `POST /hydrus_submit` to the command relay, any other `GET`/`HEAD`
/// path to the static asset server. Everything else is an explicit
/// 404 or 405 rather than a silent drop.
async fn dispatch(
    req: Request<hyper::body::Incoming>,
    method: &Method,
    path: &str,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    match *method {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext {
                path,
                is_head: *method == Method::HEAD,
            };
            if path == "/" {
                page::serve_page(&ctx, state).await
            } else {
                static_files::serve_asset(&ctx, &state.config.static_files.root).await
            }
        }
        Method::POST => {
            if path == SUBMIT_PATH {
                submit::handle_submit(req, Arc::clone(state)).await
            } else {
                logger::log_warning(&format!("No POST route for {path}"));
                http::build_404_response()
            }
        }
        Method::OPTIONS => http::build_options_response(state.config.http.enable_cors),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    }
}

/// Validate Content-Length and return 413 if it exceeds the limit
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let header = req.headers().get("content-length")?;
    let Ok(size_str) = header.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
