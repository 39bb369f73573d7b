//! Command relay endpoint module
//!
//! Accepts the control form submission, validates the command token
//! against the allow-list, and dispatches the external relay.

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::relay::{self, CommandToken};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::sync::Arc;

/// Form field carrying the command token
pub const COMMAND_FIELD: &str = "hydrus_command";

/// Handle `POST /hydrus_submit`.
///
/// Every outcome is observable: 400 for an unreadable body or a missing
/// field, 422 for a token outside the allow-list, 202 once the relay
/// subprocess has been spawned. The response is not tied to the
/// subprocess finishing; its output arrives in the log.
pub async fn handle_submit(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_error(&format!("Failed to read submit body: {e}"));
            return http::build_400_response("Failed to read request body");
        }
    };

    let Some(raw_token) = extract_command(&body) else {
        logger::log_warning(&format!(
            "Submission without '{COMMAND_FIELD}' field rejected"
        ));
        return http::build_400_response("Missing form field 'hydrus_command'");
    };

    let token = match raw_token.parse::<CommandToken>() {
        Ok(token) => token,
        Err(e) => {
            logger::log_warning(&format!("Submission rejected: {e}"));
            return http::build_422_response("Command is not in the allow-list");
        }
    };

    let relay_id = state.next_relay_id();
    match relay::spawn_relay(&state.config.relay, token, relay_id) {
        Ok(_handle) => http::response::build_202_response(token.as_str(), relay_id),
        Err(e) => {
            logger::log_error(&format!("[RELAY #{relay_id}] {e}"));
            http::build_500_response()
        }
    }
}

/// Extract the command field from an URL-encoded form body
fn extract_command(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == COMMAND_FIELD)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_command_field() {
        assert_eq!(
            extract_command(b"hydrus_command=api_ver"),
            Some("api_ver".to_string())
        );
    }

    #[test]
    fn extracts_among_other_fields() {
        assert_eq!(
            extract_command(b"first=1&hydrus_command=api_ver&last=2"),
            Some("api_ver".to_string())
        );
    }

    #[test]
    fn decodes_percent_encoding() {
        assert_eq!(
            extract_command(b"hydrus_command=api%5Fver"),
            Some("api_ver".to_string())
        );
    }

    #[test]
    fn missing_field_is_none() {
        assert_eq!(extract_command(b"other=api_ver"), None);
        assert_eq!(extract_command(b""), None);
    }
}
