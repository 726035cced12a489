//! # Target Domain
//!
//! The registrable domain a run enumerates, e.g. `example.com`.
//!
//! Parsing normalises the input (lowercase, surrounding whitespace and a trailing
//! dot removed) and rejects anything that could not be a DNS name with at least
//! two labels.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a candidate label with the domain: `www` -> `www.example.com`.
    pub fn fqdn(&self, label: &str) -> String {
        format!("{label}.{}", self.0)
    }

    /// Extracts the label sitting immediately left of this domain in `hostname`.
    ///
    /// `a.b.example.com` yields `b`. The domain itself and hostnames outside of it
    /// yield `None`.
    pub fn child_label(&self, hostname: &str) -> Option<String> {
        let hostname: String = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
        let prefix: &str = hostname.strip_suffix(self.0.as_str())?.strip_suffix('.')?;
        let label: &str = prefix.rsplit('.').next()?;
        is_valid_label(label).then(|| label.to_string())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.trim().trim_end_matches('.').to_ascii_lowercase();
        let invalid = || ConfigError::InvalidDomain(s.to_string());

        if normalized.is_empty() || normalized.len() > MAX_NAME_LEN {
            return Err(invalid());
        }

        let labels: Vec<&str> = normalized.split('.').collect();
        if labels.len() < 2 || !labels.iter().all(|label| is_valid_label(label)) {
            return Err(invalid());
        }

        Ok(Self(normalized))
    }
}

/// A single DNS label: letters, digits, `-` and `_`, not starting or ending with `-`.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
