use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, IF_NONE_MATCH};

use super::report;
use super::result::ProbeResult;

/// Cache semantics applied to a single probe request.
#[derive(Debug, Clone)]
pub enum ProbeMode {
    /// Sends `Cache-Control: no-cache` so every cache along the path is asked
    /// to revalidate. Best effort only: nothing obliges an intermediary to
    /// honor the directive, so the response may still come out of a cache.
    Bypass,
    /// Plain GET, free to hit any cache layer.
    Default,
    /// Revalidates with `If-None-Match` against a previously seen ETag.
    Conditional { etag: String },
}

/// Issues one GET request and measures it. Never returns an error: transport
/// failures are folded into the result so callers can keep working with
/// whatever the other probes produced.
pub async fn probe_url(client: &reqwest::Client, url: &str, mode: ProbeMode) -> ProbeResult {
    let requested_at = Utc::now();
    let start = Instant::now();

    let mut request = client.get(url);
    match &mode {
        ProbeMode::Bypass => request = request.header(CACHE_CONTROL, "no-cache"),
        ProbeMode::Default => {}
        ProbeMode::Conditional { etag } => request = request.header(IF_NONE_MATCH, etag.as_str()),
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            log::warn!("probe failed for {url}: {err}");
            return ProbeResult::failed(url, duration_ms, requested_at, report(&err));
        }
    };

    // Timing stops at header arrival, the body read below is not part of the
    // measurement the cache comparison is built on.
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    let http_status = response.status().as_u16();

    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_string(), value.to_string());
        }
    }

    let declared_length = headers
        .get("content-length")
        .and_then(|value| value.parse::<u64>().ok());
    let is_json = headers
        .get("content-type")
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);

    let content_length = if is_json {
        match response.json::<serde_json::Value>().await {
            Ok(body) => body.to_string().len() as u64,
            Err(_) => declared_length.unwrap_or(0),
        }
    } else {
        match response.bytes().await {
            Ok(body) => body.len() as u64,
            Err(_) => declared_length.unwrap_or(0),
        }
    };

    ProbeResult {
        url: url.to_string(),
        succeeded: true,
        http_status: Some(http_status),
        duration_ms,
        content_length,
        etag: headers.get("etag").cloned(),
        last_modified: headers.get("last-modified").cloned(),
        cache_control: headers.get("cache-control").cloned(),
        cdn_cache_status: headers.get("cf-cache-status").cloned(),
        server_date: headers.get("date").cloned(),
        headers,
        requested_at,
        error: None,
    }
}
