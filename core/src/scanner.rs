//! # Scanner
//!
//! Bounded fan-out over a candidate set.
//!
//! Every candidate becomes one task on a [`JoinSet`]. A task first acquires a permit
//! from a [`Semaphore`] sized to `ScanConfig::workers`, so at most `workers` candidates
//! are resolved or enriched at the same time. The permit is held for the whole life
//! of the task, including the post-enrichment rate limit pause.
//!
//! **Architectural Note:**
//! The scanner only talks to the outside world through the port traits carried by
//! [`resolver::Resolver`] and [`enrich::Enricher`]. It never performs IO itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use subscout_common::config::ScanConfig;
use subscout_common::models::candidate::{Candidate, CandidateSet};
use subscout_common::models::domain::Domain;
use subscout_common::models::host::{ResolvedHost, WildcardSignature};
use subscout_common::models::record::EnrichmentRecord;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error};

use crate::aggregator::Aggregator;

pub mod enrich;
pub mod http;
pub mod resolver;
pub mod wildcard;

use enrich::Enricher;
use resolver::{Resolution, Resolver};

/// Counters describing how the candidates of one run were classified.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub candidates: AtomicUsize,
    pub live: AtomicUsize,
    pub wildcard: AtomicUsize,
    pub absent: AtomicUsize,
}

/// Plain copy of [`ScanStats`] once the fan-out has completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub candidates: usize,
    pub live: usize,
    pub wildcard: usize,
    pub absent: usize,
}

impl ScanStats {
    fn summary(&self) -> ScanSummary {
        ScanSummary {
            candidates: self.candidates.load(Ordering::Relaxed),
            live: self.live.load(Ordering::Relaxed),
            wildcard: self.wildcard.load(Ordering::Relaxed),
            absent: self.absent.load(Ordering::Relaxed),
        }
    }
}

/// Everything a worker task needs, shared read-only between tasks.
struct Shared {
    domain: Domain,
    wildcard: WildcardSignature,
    resolver: Resolver,
    enricher: Enricher,
    aggregator: Arc<Aggregator>,
    config: Arc<ScanConfig>,
    stats: ScanStats,
}

pub struct Scanner {
    resolver: Resolver,
    enricher: Enricher,
    config: Arc<ScanConfig>,
}

impl Scanner {
    pub fn new(resolver: Resolver, enricher: Enricher, config: Arc<ScanConfig>) -> Self {
        Self {
            resolver,
            enricher,
            config,
        }
    }

    /// Resolves and enriches every candidate, submitting records to `aggregator`.
    ///
    /// Returns once every task has been joined.
    pub async fn run(
        self,
        domain: &Domain,
        candidates: CandidateSet,
        wildcard: WildcardSignature,
        aggregator: Arc<Aggregator>,
    ) -> ScanSummary {
        let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let shared: Arc<Shared> = Arc::new(Shared {
            domain: domain.clone(),
            wildcard,
            resolver: self.resolver,
            enricher: self.enricher,
            aggregator,
            config: self.config,
            stats: ScanStats::default(),
        });

        let mut tasks: JoinSet<()> = JoinSet::new();
        for candidate in candidates {
            let permit: OwnedSemaphorePermit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Worker pool closed unexpectedly: {e}");
                    break;
                }
            };
            let shared: Arc<Shared> = shared.clone();
            tasks.spawn(async move {
                process_candidate(&shared, candidate).await;
                drop(permit);
            });

            while let Some(joined) = tasks.try_join_next() {
                report_join(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            report_join(joined);
        }

        shared.stats.summary()
    }
}

fn report_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Worker task failed: {e}");
    }
}

async fn process_candidate(shared: &Shared, candidate: Candidate) {
    shared.stats.candidates.fetch_add(1, Ordering::Relaxed);

    let host: ResolvedHost = match shared
        .resolver
        .classify(&candidate, &shared.domain, &shared.wildcard)
        .await
    {
        Resolution::Live(host) => host,
        Resolution::Wildcard(_) => {
            shared.stats.wildcard.fetch_add(1, Ordering::Relaxed);
            return;
        }
        Resolution::Absent => {
            shared.stats.absent.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    shared.stats.live.fetch_add(1, Ordering::Relaxed);
    debug!(fqdn = %host.fqdn, addr = %host.addr, "Resolved");

    let records: Vec<EnrichmentRecord> = shared.enricher.enrich(&host, &shared.domain).await;
    for record in records {
        shared.aggregator.submit(record);
    }

    if !shared.config.rate_limit_delay.is_zero() {
        tokio::time::sleep(shared.config.rate_limit_delay).await;
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
