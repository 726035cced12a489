use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::lookup_ip::LookupIp;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::system_conf;
use subscout_common::error::LookupError;
use subscout_common::ports::DnsResolver;
use tracing::{debug, warn};

/// [`DnsResolver`] backed by the hickory async resolver.
///
/// Retries are owned by the pipeline, so the resolver itself makes a single attempt.
pub struct HickoryResolver {
    inner: TokioAsyncResolver,
}

impl HickoryResolver {
    /// Uses the host's resolver configuration, falling back to public resolvers.
    pub fn from_system(timeout: Duration) -> Self {
        let (config, opts): (ResolverConfig, ResolverOpts) = match system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!("Could not read system resolver configuration, using defaults: {e}");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self::with_config(config, opts, timeout)
    }

    pub fn with_config(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn lookup(&self, name: &str) -> Result<IpAddr, LookupError> {
        let fqdn: String = format!("{}.", name.trim_end_matches('.'));
        let response: LookupIp = self.inner.lookup_ip(fqdn).await.map_err(classify)?;
        response.iter().next().ok_or(LookupError::NotFound)
    }

    async fn reverse(&self, addr: IpAddr) -> Option<String> {
        match self.inner.reverse_lookup(addr).await {
            Ok(lookup) => lookup
                .iter()
                .next()
                .map(|ptr| ptr.to_string().trim_end_matches('.').to_string()),
            Err(e) => {
                debug!(%addr, "Reverse lookup failed: {e}");
                None
            }
        }
    }
}

/// NXDOMAIN and empty answers are absence. SERVFAIL, timeouts and IO are transient.
fn classify(err: ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code != ResponseCode::ServFail =>
        {
            LookupError::NotFound
        }
        _ => LookupError::Transient(err.to_string()),
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
