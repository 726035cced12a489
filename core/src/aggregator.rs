//! # Result Aggregator
//!
//! Shared collection point for enrichment records produced by concurrent workers.
//!
//! Appends are serialized behind a [`Mutex`]; a record whose `(subdomain, scheme)`
//! pair was already submitted is dropped. The aggregator is consumed by
//! [`Aggregator::finalize`] once every worker has finished.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use subscout_common::models::record::{EnrichmentRecord, ResultSet, Scheme};
use tracing::debug;

/// Called for every accepted record with the number of records collected so far.
pub type RecordObserver = Arc<dyn Fn(&EnrichmentRecord, usize) + Send + Sync>;

#[derive(Default)]
struct Inner {
    records: Vec<EnrichmentRecord>,
    keys: HashSet<(String, Scheme)>,
}

#[derive(Default)]
pub struct Aggregator {
    inner: Mutex<Inner>,
    observer: Option<RecordObserver>,
}

impl Aggregator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_observer(observer: RecordObserver) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::default(),
            observer: Some(observer),
        })
    }

    /// Appends `record`. Returns `false` if its `(subdomain, scheme)` was already present.
    pub fn submit(&self, record: EnrichmentRecord) -> bool {
        let notify: Option<(EnrichmentRecord, usize)> = {
            let mut inner: MutexGuard<'_, Inner> = self.lock();
            let key: (String, Scheme) = (record.subdomain.clone(), record.scheme);
            if !inner.keys.insert(key) {
                debug!("Dropping duplicate record for {}", record.url);
                return false;
            }

            let copy: Option<EnrichmentRecord> = self.observer.as_ref().map(|_| record.clone());
            inner.records.push(record);
            copy.map(|copy| (copy, inner.records.len()))
        };

        // Observers run without the lock held.
        if let (Some(observer), Some((record, count))) = (&self.observer, notify) {
            observer(&record, count);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of everything collected so far.
    pub fn snapshot(&self) -> ResultSet {
        ResultSet::from(self.lock().records.clone())
    }

    /// Consumes the aggregator and returns the final result set.
    ///
    /// Falls back to a snapshot when other handles are still alive.
    pub fn finalize(self: Arc<Self>) -> ResultSet {
        match Arc::try_unwrap(self) {
            Ok(aggregator) => {
                let inner: Inner = aggregator
                    .inner
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner);
                ResultSet::from(inner.records)
            }
            Err(shared) => shared.snapshot(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
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
