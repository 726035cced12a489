//! # Subdomain Discovery Service
//!
//! Implements the core "enumerate one domain" use case.
//!
//! The service wires the resolver, wildcard sentinel, scanner and aggregator together
//! and is the only entry point the CLI and the integration tests use. All IO goes
//! through the collaborators handed to [`Discovery::new`].

use std::sync::Arc;
use std::time::Instant;

use subscout_common::config::ScanConfig;
use subscout_common::error::ConfigError;
use subscout_common::models::candidate::CandidateSet;
use subscout_common::models::domain::Domain;
use subscout_common::models::host::WildcardSignature;
use subscout_common::models::record::ResultSet;
use subscout_common::ports::{CertificateInspector, DnsResolver, HttpProber, PortScanner};
use tracing::{info, warn};

use crate::aggregator::{Aggregator, RecordObserver};
use crate::scanner::enrich::Enricher;
use crate::scanner::resolver::Resolver;
use crate::scanner::{ScanSummary, Scanner, wildcard};

/// The outbound adapters one run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub dns: Arc<dyn DnsResolver>,
    pub http: Arc<dyn HttpProber>,
    pub ports: Arc<dyn PortScanner>,
    pub certs: Arc<dyn CertificateInspector>,
}

/// Application service for subdomain discovery.
///
/// Orchestrates one run by:
/// 1. probing the wildcard sentinel once;
/// 2. fanning out resolution and enrichment over the candidates;
/// 3. collecting the records into a [`ResultSet`].
pub struct Discovery {
    collaborators: Collaborators,
    config: Arc<ScanConfig>,
    observer: Option<RecordObserver>,
}

/// Outcome of [`Discovery::run_with_summary`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: ResultSet,
    pub summary: ScanSummary,
    pub wildcard: WildcardSignature,
}

impl Discovery {
    /// Rejects structurally invalid configuration before any work starts.
    pub fn new(collaborators: Collaborators, config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            collaborators,
            config: Arc::new(config),
            observer: None,
        })
    }

    /// Registers a callback invoked for every accepted record.
    pub fn with_observer(mut self, observer: RecordObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Enumerates `candidates` under `domain` and returns every record found.
    pub async fn run(&self, domain: &Domain, candidates: CandidateSet) -> ResultSet {
        self.run_with_summary(domain, candidates).await.results
    }

    pub async fn run_with_summary(&self, domain: &Domain, candidates: CandidateSet) -> RunReport {
        let started: Instant = Instant::now();
        let resolver: Resolver = Resolver::new(
            self.collaborators.dns.clone(),
            self.config.retry,
            self.config.timeouts.dns,
        );

        // Must complete before any candidate is resolved.
        let signature: WildcardSignature = wildcard::detect(&resolver, domain).await;

        let aggregator: Arc<Aggregator> = match &self.observer {
            Some(observer) => Aggregator::with_observer(observer.clone()),
            None => Aggregator::new(),
        };

        info!("Testing {} candidates under {domain}", candidates.len());

        let enricher: Enricher = Enricher::new(
            resolver.clone(),
            self.collaborators.http.clone(),
            self.collaborators.ports.clone(),
            self.collaborators.certs.clone(),
            self.config.clone(),
        );
        let scanner: Scanner = Scanner::new(resolver, enricher, self.config.clone());
        let summary: ScanSummary = scanner
            .run(domain, candidates, signature, aggregator.clone())
            .await;

        let results: ResultSet = aggregator.finalize();

        if summary.wildcard > 0 {
            warn!("{} candidates matched the wildcard address and were dropped", summary.wildcard);
        }
        info!(
            "{domain}: {} live hosts, {} records in {:.2?}",
            summary.live,
            results.len(),
            started.elapsed()
        );

        RunReport {
            results,
            summary,
            wildcard: signature,
        }
    }
}
