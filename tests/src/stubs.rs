//! In-memory collaborators for driving the whole pipeline without a network.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use subscout_common::config::{RetryPolicy, ScanConfig};
use subscout_common::error::{LookupError, ProbeError};
use subscout_common::models::host::{HttpResponse, PortReport, ResolvedHost};
use subscout_common::ports::{CertificateInspector, DnsResolver, HttpProber, PortScanner};
use subscout_core::discovery::Collaborators;

pub fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

/// A scan configuration with every pause removed.
pub fn fast_config(workers: usize) -> ScanConfig {
    ScanConfig {
        workers,
        archive: false,
        retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
        rate_limit_delay: Duration::ZERO,
        ..ScanConfig::default()
    }
}

/// Authoritative zone held in memory.
///
/// Names missing from `records` are `NotFound`, or resolve to the wildcard address
/// when one is set. Names listed in `failing` fail transiently that many times first.
#[derive(Default)]
pub struct StubResolver {
    records: HashMap<String, IpAddr>,
    ptr: HashMap<IpAddr, String>,
    wildcard: Option<IpAddr>,
    failing: Mutex<HashMap<String, u32>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, name: &str, addr: IpAddr) -> Self {
        self.records.insert(name.to_string(), addr);
        self
    }

    pub fn with_ptr(mut self, addr: IpAddr, name: &str) -> Self {
        self.ptr.insert(addr, name.to_string());
        self
    }

    pub fn with_wildcard(mut self, addr: IpAddr) -> Self {
        self.wildcard = Some(addr);
        self
    }

    pub fn failing(self, name: &str, times: u32) -> Self {
        self.failing
            .lock()
            .unwrap()
            .insert(name.to_string(), times);
        self
    }

    pub fn calls_for(&self, name: &str) -> u32 {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DnsResolver for StubResolver {
    async fn lookup(&self, name: &str) -> Result<IpAddr, LookupError> {
        *self.calls.lock().unwrap().entry(name.to_string()).or_insert(0) += 1;

        if let Some(remaining) = self.failing.lock().unwrap().get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LookupError::Transient("SERVFAIL".into()));
            }
        }

        self.records
            .get(name)
            .copied()
            .or(self.wildcard)
            .ok_or(LookupError::NotFound)
    }

    async fn reverse(&self, addr: IpAddr) -> Option<String> {
        self.ptr.get(&addr).cloned()
    }
}

/// Serves canned responses per URL. Unknown URLs fail to connect.
#[derive(Default)]
pub struct StubHttp {
    pages: HashMap<String, HttpResponse>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: AtomicUsize,
}

impl StubHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            HttpResponse {
                status,
                server: Some("stub/1.0".into()),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Highest number of requests observed in flight at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpProber for StubHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProbeError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now: usize = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response: Result<HttpResponse, ProbeError> = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ProbeError::Connect(format!("no page for {url}")));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// Reports the same open ports for every host.
#[derive(Default)]
pub struct StubPorts {
    report: PortReport,
}

impl StubPorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open(mut self, port: u16, banner: Option<&str>) -> Self {
        self.report.open.push(port);
        if let Some(banner) = banner {
            self.report.banners.insert(port, banner.to_string());
        }
        self
    }
}

#[async_trait]
impl PortScanner for StubPorts {
    async fn scan(&self, _host: &ResolvedHost, ports: &[u16]) -> PortReport {
        let open: Vec<u16> = self
            .report
            .open
            .iter()
            .copied()
            .filter(|port| ports.contains(port))
            .collect();
        let banners = self
            .report
            .banners
            .iter()
            .filter(|(port, _)| open.contains(port))
            .map(|(port, banner)| (*port, banner.clone()))
            .collect();
        PortReport { open, banners }
    }
}

/// Presents a certificate listing the host itself plus `extra` names.
#[derive(Default)]
pub struct StubCerts {
    extra: Vec<String>,
    calls: AtomicUsize,
}

impl StubCerts {
    pub fn new(extra: &[&str]) -> Self {
        Self {
            extra: extra.iter().map(|name| name.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateInspector for StubCerts {
    async fn sans(&self, host: &ResolvedHost) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut sans: Vec<String> = vec![host.fqdn.clone()];
        sans.extend(self.extra.iter().cloned());
        sans
    }
}

/// Handles kept by a test to inspect the stubs after a run.
pub struct Stubs {
    pub dns: Arc<StubResolver>,
    pub http: Arc<StubHttp>,
    pub certs: Arc<StubCerts>,
}

impl Stubs {
    pub fn new(dns: StubResolver, http: StubHttp) -> Self {
        Self {
            dns: Arc::new(dns),
            http: Arc::new(http),
            certs: Arc::new(StubCerts::new(&[])),
        }
    }

    pub fn with_certs(mut self, certs: StubCerts) -> Self {
        self.certs = Arc::new(certs);
        self
    }

    pub fn collaborators(&self, ports: StubPorts) -> Collaborators {
        Collaborators {
            dns: self.dns.clone(),
            http: self.http.clone(),
            ports: Arc::new(ports),
            certs: self.certs.clone(),
        }
    }
}
