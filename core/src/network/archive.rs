//! # Web Archive Index
//!
//! Mines hostnames from the Wayback Machine CDX API.
//!
//! API: `http://web.archive.org/cdx/search/cdx?url=*.example.com&output=json&fl=original`
//!
//! With `output=json` the body is an array of rows, the first row being the
//! field names: `[["original"],["http://www.example.com/"],...]`.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use subscout_common::error::ProbeError;
use subscout_common::models::domain::Domain;
use subscout_common::ports::ArchiveIndex;
use tracing::debug;

pub const WAYBACK_CDX_ENDPOINT: &str = "http://web.archive.org/cdx/search/cdx";

pub struct WaybackArchive {
    client: Client,
    endpoint: String,
}

impl WaybackArchive {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(WAYBACK_CDX_ENDPOINT, timeout)
    }

    /// Points the adapter at another CDX compatible endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client: Client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ArchiveIndex for WaybackArchive {
    async fn hostnames(&self, domain: &Domain) -> Result<Vec<String>, ProbeError> {
        let pattern: String = format!("*.{domain}");
        let response: Response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("url", pattern.as_str()),
                ("output", "json"),
                ("fl", "original"),
                ("collapse", "urlkey"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Connect(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status().as_u16()));
        }

        let body: Vec<u8> = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Malformed(e.to_string()))?
            .to_vec();
        let hostnames: Vec<String> = parse_cdx(&body)?;
        debug!("Archive index returned {} distinct hostnames for {domain}", hostnames.len());
        Ok(hostnames)
    }
}

/// Distinct lowercase hostnames of every URL in a CDX JSON body, in first-seen order.
pub fn parse_cdx(body: &[u8]) -> Result<Vec<String>, ProbeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> =
        serde_json::from_slice(body).map_err(|e| ProbeError::Malformed(e.to_string()))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut hostnames: Vec<String> = Vec::new();
    for row in rows.iter().skip(1) {
        let Some(hostname) = row.first().and_then(|url| hostname_of(url)) else {
            continue;
        };
        if seen.insert(hostname.clone()) {
            hostnames.push(hostname);
        }
    }
    Ok(hostnames)
}

fn hostname_of(url: &str) -> Option<String> {
    let parsed: Url = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => Url::parse(&format!("http://{url}")).ok()?,
    };
    parsed.host_str().map(str::to_ascii_lowercase)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
