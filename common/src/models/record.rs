use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn url_for(&self, fqdn: &str) -> String {
        format!("{}://{fqdn}", self.as_str())
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything learned about one host over one scheme.
///
/// Exactly one record exists per `(subdomain, scheme)` that answered over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub domain: String,
    pub subdomain: String,
    pub ip: IpAddr,
    pub reverse_dns: Option<String>,
    pub scheme: Scheme,
    pub url: String,
    pub status: u16,
    pub length: usize,
    pub title: Option<String>,
    /// Hex encoded SHA-256 of the raw response body.
    pub content_hash: String,
    pub server_header: Option<String>,
    pub ssl_sans: Vec<String>,
    pub open_ports: Vec<u16>,
    pub banners: BTreeMap<u16, String>,
}

impl EnrichmentRecord {
    pub fn key(&self) -> (&str, Scheme) {
        (&self.subdomain, self.scheme)
    }
}

/// Final records of one run, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<EnrichmentRecord>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EnrichmentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichmentRecord> {
        self.records.iter()
    }

    /// Compares two result sets while ignoring arrival order.
    pub fn eq_unordered(&self, other: &ResultSet) -> bool {
        self.sorted_refs() == other.sorted_refs()
    }

    fn sorted_refs(&self) -> Vec<&EnrichmentRecord> {
        let mut refs: Vec<&EnrichmentRecord> = self.records.iter().collect();
        refs.sort_by(|a, b| a.key().cmp(&b.key()));
        refs
    }
}

impl From<Vec<EnrichmentRecord>> for ResultSet {
    fn from(records: Vec<EnrichmentRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a EnrichmentRecord;
    type IntoIter = std::slice::Iter<'a, EnrichmentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
