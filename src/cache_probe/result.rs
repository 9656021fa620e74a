use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a single timed GET request. Produced once per probe and never
/// mutated afterwards; the verification call that issued it is its only owner.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub succeeded: bool,
    pub http_status: Option<u16>,
    /// Wall-clock time until the response headers arrived. Recorded even when
    /// the request failed, using the elapsed time at the point of failure.
    pub duration_ms: f64,
    /// Best-effort body size: serialized JSON length, raw byte count, or the
    /// declared `content-length` when the body could not be read.
    pub content_length: u64,
    /// Response headers with lower-case names.
    pub headers: HashMap<String, String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub cache_control: Option<String>,
    pub cdn_cache_status: Option<String>,
    pub server_date: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl ProbeResult {
    /// A transport-level failure. No response data, only the elapsed time and
    /// the error chain.
    pub fn failed(url: &str, duration_ms: f64, requested_at: DateTime<Utc>, error: String) -> Self {
        ProbeResult {
            url: url.to_string(),
            succeeded: false,
            http_status: None,
            duration_ms,
            content_length: 0,
            headers: HashMap::new(),
            etag: None,
            last_modified: None,
            cache_control: None,
            cdn_cache_status: None,
            server_date: None,
            requested_at,
            error: Some(error),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
