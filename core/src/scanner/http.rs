//! HTTP fingerprinting of a live host.
//!
//! The title heuristic is intentionally literal: the first `<title>` and the first
//! `</title>` in the body, case-sensitive, with no HTML parsing.

use std::time::Duration;

use sha2::{Digest, Sha256};
use subscout_common::config::RetryPolicy;
use subscout_common::error::ProbeError;
use subscout_common::models::host::HttpResponse;
use subscout_common::ports::HttpProber;
use tokio::time::timeout;
use tracing::{debug, warn};

const TITLE_OPEN: &str = "<title>";
const TITLE_CLOSE: &str = "</title>";

/// What one successful GET revealed about a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFingerprint {
    pub url: String,
    pub status: u16,
    pub length: usize,
    pub title: Option<String>,
    pub content_hash: String,
    pub server: Option<String>,
}

impl HttpFingerprint {
    pub fn from_response(url: &str, response: &HttpResponse) -> Self {
        let text: std::borrow::Cow<'_, str> = String::from_utf8_lossy(&response.body);
        Self {
            url: url.to_string(),
            status: response.status,
            length: response.body.len(),
            title: extract_title(&text),
            content_hash: content_hash(&response.body),
            server: response.server.clone(),
        }
    }
}

/// Text between the first `<title>` and the first `</title>`, trimmed.
///
/// Returns `None` if either marker is missing or the close marker comes first.
pub fn extract_title(body: &str) -> Option<String> {
    let open: usize = body.find(TITLE_OPEN)? + TITLE_OPEN.len();
    let close: usize = body.find(TITLE_CLOSE)?;
    if close < open {
        return None;
    }
    Some(body[open..close].trim().to_string())
}

/// Lowercase hex SHA-256 of the raw body.
pub fn content_hash(body: &[u8]) -> String {
    format!("{:x}", Sha256::digest(body))
}

/// GETs `url`, retrying transport failures according to `retry`.
///
/// Any HTTP status is a success. Exhausting the retries yields `None` and a warning.
pub async fn probe(
    prober: &dyn HttpProber,
    url: &str,
    retry: RetryPolicy,
    http_timeout: Duration,
) -> Option<HttpFingerprint> {
    let attempts: u32 = retry.max_attempts.max(1);
    let mut last_error: ProbeError = ProbeError::Timeout;

    for attempt in 1..=attempts {
        let result: Result<HttpResponse, ProbeError> =
            match timeout(http_timeout, prober.get(url)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ProbeError::Timeout),
            };

        match result {
            Ok(response) => return Some(HttpFingerprint::from_response(url, &response)),
            Err(e) => {
                debug!(url, attempt, "HTTP probe failed: {e}");
                last_error = e;
            }
        }

        if attempt < attempts && !retry.delay.is_zero() {
            tokio::time::sleep(retry.delay).await;
        }
    }

    warn!("Skipping {url} after {attempts} attempts: {last_error}");
    None
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
