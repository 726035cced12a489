//! # Host Enrichment
//!
//! Turns one [`ResolvedHost`] into zero, one or two [`EnrichmentRecord`]s.
//!
//! Reverse DNS, the port scan and HTTP probing run concurrently. SAN extraction only
//! happens for `https` and only after the https probe answered. Each probe fails on
//! its own: a dead port scan never costs the HTTP record and vice versa.

use std::sync::Arc;

use subscout_common::config::ScanConfig;
use subscout_common::models::domain::Domain;
use subscout_common::models::host::{PortReport, ResolvedHost};
use subscout_common::models::record::{EnrichmentRecord, Scheme};
use subscout_common::ports::{CertificateInspector, HttpProber, PortScanner};
use tokio::time::timeout;
use tracing::debug;

use super::http::{self, HttpFingerprint};
use super::resolver::Resolver;

pub struct Enricher {
    resolver: Resolver,
    http: Arc<dyn HttpProber>,
    ports: Arc<dyn PortScanner>,
    certs: Arc<dyn CertificateInspector>,
    config: Arc<ScanConfig>,
}

impl Enricher {
    pub fn new(
        resolver: Resolver,
        http: Arc<dyn HttpProber>,
        ports: Arc<dyn PortScanner>,
        certs: Arc<dyn CertificateInspector>,
        config: Arc<ScanConfig>,
    ) -> Self {
        Self {
            resolver,
            http,
            ports,
            certs,
            config,
        }
    }

    /// One record per scheme that answered over HTTP.
    pub async fn enrich(&self, host: &ResolvedHost, domain: &Domain) -> Vec<EnrichmentRecord> {
        let (reverse_dns, report, probes) = tokio::join!(
            self.resolver.reverse(host.addr),
            self.scan_ports(host),
            self.probe_schemes(host),
        );

        debug!(
            fqdn = %host.fqdn,
            open = report.open.len(),
            answered = probes.len(),
            "Enrichment finished"
        );

        probes
            .into_iter()
            .map(|(scheme, fingerprint, ssl_sans)| EnrichmentRecord {
                domain: domain.to_string(),
                subdomain: host.fqdn.clone(),
                ip: host.addr,
                reverse_dns: reverse_dns.clone(),
                scheme,
                url: fingerprint.url,
                status: fingerprint.status,
                length: fingerprint.length,
                title: fingerprint.title,
                content_hash: fingerprint.content_hash,
                server_header: fingerprint.server,
                ssl_sans,
                open_ports: report.open.clone(),
                banners: report.banners.clone(),
            })
            .collect()
    }

    async fn scan_ports(&self, host: &ResolvedHost) -> PortReport {
        if self.config.ports.is_empty() {
            return PortReport::default();
        }
        self.ports.scan(host, &self.config.ports).await
    }

    async fn probe_schemes(&self, host: &ResolvedHost) -> Vec<(Scheme, HttpFingerprint, Vec<String>)> {
        let mut answered: Vec<(Scheme, HttpFingerprint, Vec<String>)> = Vec::new();

        for scheme in self.config.schemes() {
            let url: String = scheme.url_for(&host.fqdn);
            let fingerprint: Option<HttpFingerprint> = http::probe(
                self.http.as_ref(),
                &url,
                self.config.retry,
                self.config.timeouts.http,
            )
            .await;

            let Some(fingerprint) = fingerprint else {
                continue;
            };

            let sans: Vec<String> = match scheme {
                Scheme::Https => self.inspect_certificate(host).await,
                Scheme::Http => Vec::new(),
            };
            answered.push((scheme, fingerprint, sans));
        }

        answered
    }

    async fn inspect_certificate(&self, host: &ResolvedHost) -> Vec<String> {
        timeout(self.config.timeouts.tls, self.certs.sans(host))
            .await
            .unwrap_or_default()
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
