//! Static asset server module
//!
//! Serves files under the configured static root verbatim, with MIME
//! inference by extension. Paths resolving outside the root are refused.

use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve a static file for any unmatched GET path
pub async fn serve_asset(ctx: &RequestContext<'_>, static_root: &str) -> Response<Full<Bytes>> {
    match load_from_root(static_root, ctx.path).await {
        Some((content, content_type)) => {
            http::response::build_asset_response(content, content_type, ctx.is_head)
        }
        None => http::build_404_response(),
    }
}

/// Load a file under `static_root`, refusing anything that escapes it.
///
/// Containment is enforced by canonicalizing both the root and the
/// candidate and requiring a prefix match, not just by stripping `..`.
pub(crate) async fn load_from_root(static_root: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let clean_path = path.trim_start_matches('/').replace("..", "");
    let candidate = Path::new(static_root).join(clean_path);

    let root_canonical = match Path::new(static_root).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root not found or inaccessible '{static_root}': {e}"
            ));
            return None;
        }
    };

    // A missing file is an ordinary 404, no log needed
    let Ok(candidate_canonical) = candidate.canonicalize() else {
        return None;
    };
    if !candidate_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            candidate_canonical.display()
        ));
        return None;
    }
    if !candidate_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&candidate_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                candidate_canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::content_type(
        candidate_canonical
            .extension()
            .and_then(|e| e.to_str()),
    );

    Some((content, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Static root with one asset plus a secret file outside the root
    fn temp_root(name: &str) -> (PathBuf, String) {
        let base = std::env::temp_dir().join(format!(
            "hydrus-relay-static-{}-{name}",
            std::process::id()
        ));
        let root = base.join("public");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("hello.txt"), "hello").unwrap();
        std::fs::write(base.join("secret.txt"), "secret").unwrap();
        (base, root.to_string_lossy().into_owned())
    }

    #[tokio::test]
    async fn serves_existing_file_with_inferred_type() {
        let (_base, root) = temp_root("hit");
        let (content, content_type) = load_from_root(&root, "/hello.txt").await.unwrap();
        assert_eq!(content, b"hello");
        assert_eq!(content_type, "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let (_base, root) = temp_root("miss");
        assert!(load_from_root(&root, "/nope.txt").await.is_none());
    }

    #[tokio::test]
    async fn directory_request_is_none() {
        let (_base, root) = temp_root("dir");
        assert!(load_from_root(&root, "/").await.is_none());
    }

    #[tokio::test]
    async fn traversal_outside_root_is_refused() {
        let (_base, root) = temp_root("traversal");
        assert!(load_from_root(&root, "/../secret.txt").await.is_none());
        assert!(load_from_root(&root, "/..%2Fsecret.txt").await.is_none());
    }
}
