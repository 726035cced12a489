use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use subscout_common::config::RetryPolicy;
use subscout_common::error::LookupError;
use subscout_common::models::candidate::Candidate;
use subscout_common::models::domain::Domain;
use subscout_common::models::host::{ResolvedHost, WildcardSignature};
use subscout_common::ports::DnsResolver;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of resolving one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Live(ResolvedHost),
    /// Resolved to the wildcard address and is a false positive.
    Wildcard(ResolvedHost),
    Absent,
}

/// Forward resolution with bounded retry on transient failures.
#[derive(Clone)]
pub struct Resolver {
    dns: Arc<dyn DnsResolver>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Resolver {
    pub fn new(dns: Arc<dyn DnsResolver>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            dns,
            retry,
            timeout,
        }
    }

    /// Resolves `fqdn` to a single address.
    ///
    /// `NotFound` returns immediately. Timeouts and other transient failures are retried
    /// until `max_attempts` is reached, with `delay` between attempts.
    pub async fn lookup(&self, fqdn: &str) -> Option<IpAddr> {
        let attempts: u32 = self.retry.max_attempts.max(1);
        let mut last_error: Option<LookupError> = None;

        for attempt in 1..=attempts {
            let result: Result<IpAddr, LookupError> =
                match timeout(self.timeout, self.dns.lookup(fqdn)).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(LookupError::Transient("lookup timed out".into())),
                };

            match result {
                Ok(addr) => return Some(addr),
                Err(LookupError::NotFound) => return None,
                Err(e) => {
                    debug!(fqdn, attempt, "Transient lookup failure: {e}");
                    last_error = Some(e);
                }
            }

            if attempt < attempts && !self.retry.delay.is_zero() {
                tokio::time::sleep(self.retry.delay).await;
            }
        }

        if let Some(e) = last_error {
            warn!("Giving up on {fqdn} after {attempts} attempts: {e}");
        }
        None
    }

    pub async fn resolve(&self, candidate: &Candidate, domain: &Domain) -> Option<ResolvedHost> {
        let fqdn: String = candidate.fqdn(domain);
        let addr: IpAddr = self.lookup(&fqdn).await?;
        Some(ResolvedHost::new(fqdn, addr))
    }

    /// Resolves and checks the address against the wildcard signature.
    pub async fn classify(
        &self,
        candidate: &Candidate,
        domain: &Domain,
        wildcard: &WildcardSignature,
    ) -> Resolution {
        match self.resolve(candidate, domain).await {
            Some(host) if wildcard.matches(&host.addr) => {
                debug!(fqdn = %host.fqdn, addr = %host.addr, "Suppressing wildcard match");
                Resolution::Wildcard(host)
            }
            Some(host) => Resolution::Live(host),
            None => Resolution::Absent,
        }
    }

    /// Best-effort PTR lookup, bounded by the DNS timeout and never retried.
    pub async fn reverse(&self, addr: IpAddr) -> Option<String> {
        timeout(self.timeout, self.dns.reverse(addr)).await.ok().flatten()
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
