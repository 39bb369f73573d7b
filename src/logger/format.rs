//! Access log format module
//!
//! Supports the `common` (CLF), `combined`, and `json` access log
//! formats; anything unrecognized falls back to `common`.

use chrono::Local;

/// Access log entry containing request and response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new entry with the current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the entry according to the configured format name
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "json" => self.format_json(),
            _ => self.format_common(),
        }
    }

    fn request_line(&self) -> String {
        let query = self
            .query
            .as_ref()
            .map(|q| format!("?{q}"))
            .unwrap_or_default();
        format!(
            "{} {}{} HTTP/{}",
            self.method, self.path, query, self.http_version
        )
    }

    /// Common Log Format (CLF)
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// Apache/Nginx combined format: CLF plus referer and user agent
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// JSON structured log format, built by hand to keep the logger
    /// free of serialization dependencies
    fn format_json(&self) -> String {
        let optional = |value: &Option<String>| {
            value
                .as_ref()
                .map_or_else(|| "null".to_string(), |v| format!("\"{}\"", escape_json(v)))
        };

        format!(
            r#"{{"remote_addr":"{}","time":"{}","request":"{}","status":{},"body_bytes":{},"referer":{},"user_agent":{},"request_time_us":{}}}"#,
            escape_json(&self.remote_addr),
            self.time.to_rfc3339(),
            escape_json(&self.request_line()),
            self.status,
            self.body_bytes,
            optional(&self.referer),
            optional(&self.user_agent),
            self.request_time_us,
        )
    }
}

/// Escape special characters for a JSON string value
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "127.0.0.1:51432".to_string(),
            "POST".to_string(),
            "/hydrus_submit".to_string(),
        );
        entry.status = 202;
        entry.body_bytes = 57;
        entry.user_agent = Some("curl/8.5".to_string());
        entry
    }

    #[test]
    fn common_format_has_request_line_and_status() {
        let line = sample_entry().format("common");
        assert!(line.contains("127.0.0.1:51432"));
        assert!(line.contains("\"POST /hydrus_submit HTTP/1.1\""));
        assert!(line.contains("202 57"));
        assert!(!line.contains("curl"));
    }

    #[test]
    fn combined_format_appends_referer_and_user_agent() {
        let line = sample_entry().format("combined");
        assert!(line.contains("\"-\""));
        assert!(line.contains("\"curl/8.5\""));
    }

    #[test]
    fn json_format_is_structured() {
        let line = sample_entry().format("json");
        assert!(line.contains(r#""status":202"#));
        assert!(line.contains(r#""body_bytes":57"#));
        assert!(line.contains(r#""referer":null"#));
    }

    #[test]
    fn unknown_format_falls_back_to_common() {
        let entry = sample_entry();
        assert_eq!(entry.format("fancy"), entry.format("common"));
    }

    #[test]
    fn json_values_are_escaped() {
        let mut entry = sample_entry();
        entry.user_agent = Some("agent \"quoted\"".to_string());
        let line = entry.format("json");
        assert!(line.contains(r#"agent \"quoted\""#));
    }
}
