use std::collections::HashSet;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::record::Scheme;

/// Terminal presentation settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Suppresses the banner.
    pub no_banner: bool,
    /// 0 prints everything, 1 drops decorations, 2 only prints warnings and errors.
    pub quiet: u8,
    /// Lowers the log filter to `debug`.
    pub verbose: bool,
}

/// How often and how patiently a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(300),
        }
    }
}

/// Upper bounds for every network operation the pipeline performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub dns: Duration,
    pub connect: Duration,
    pub banner: Duration,
    pub http: Duration,
    pub tls: Duration,
    pub archive: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            dns: Duration::from_secs(5),
            connect: Duration::from_secs(2),
            banner: Duration::from_secs(3),
            http: Duration::from_secs(5),
            tls: Duration::from_secs(3),
            archive: Duration::from_secs(10),
        }
    }
}

/// Everything the discovery pipeline needs to know about a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Maximum number of candidates resolved and enriched at the same time.
    pub workers: usize,
    /// TCP ports to scan on every live host. Empty disables port scanning.
    pub ports: Vec<u16>,
    /// Also probe `https://` in addition to `http://`.
    pub https: bool,
    /// Mine candidates from the web archive index.
    pub archive: bool,
    pub retry: RetryPolicy,
    pub timeouts: Timeouts,
    /// Maximum number of bytes read when grabbing a banner.
    pub banner_bytes: usize,
    /// Pause applied after each host's enrichment.
    pub rate_limit_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 32,
            ports: Vec::new(),
            https: false,
            archive: true,
            retry: RetryPolicy::default(),
            timeouts: Timeouts::default(),
            banner_bytes: 1024,
            rate_limit_delay: Duration::from_millis(300),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if let Some(port) = self.ports.iter().find(|port| **port == 0) {
            return Err(ConfigError::InvalidPort(port.to_string()));
        }
        Ok(())
    }

    /// Schemes probed for every live host, `http` first.
    pub fn schemes(&self) -> Vec<Scheme> {
        if self.https {
            vec![Scheme::Http, Scheme::Https]
        } else {
            vec![Scheme::Http]
        }
    }
}

/// Parses a comma-separated port list such as `"22,80,443"`.
///
/// Order is preserved, repeated ports are kept once.
pub fn parse_ports(s: &str) -> Result<Vec<u16>, ConfigError> {
    let mut seen: HashSet<u16> = HashSet::new();
    let mut ports: Vec<u16> = Vec::new();

    for part in s.split(',') {
        let part: &str = part.trim();
        if part.is_empty() {
            continue;
        }
        let port: u16 = part
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| ConfigError::InvalidPort(part.to_string()))?;
        if seen.insert(port) {
            ports.push(port);
        }
    }

    Ok(ports)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
