use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;

use serde::Serialize;

use crate::models::domain::{self, Domain};

/// Where a candidate label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrigin {
    Wordlist,
    Archive,
}

impl fmt::Display for CandidateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateOrigin::Wordlist => f.write_str("wordlist"),
            CandidateOrigin::Archive => f.write_str("archive"),
        }
    }
}

/// A subdomain fragment to test under the target domain.
///
/// Fragments are stored lowercase. A fragment may span several labels
/// (`dev.api`), each of which must be a valid DNS label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    label: String,
    origin: CandidateOrigin,
}

impl Candidate {
    /// Normalises `raw` and returns `None` when nothing usable is left.
    pub fn new(raw: &str, origin: CandidateOrigin) -> Option<Self> {
        let label: String = raw.trim().trim_matches('.').to_ascii_lowercase();
        if label.is_empty() || !label.split('.').all(domain::is_valid_label) {
            return None;
        }
        Some(Self { label, origin })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn origin(&self) -> CandidateOrigin {
        self.origin
    }

    pub fn fqdn(&self, domain: &Domain) -> String {
        domain.fqdn(&self.label)
    }
}

/// Deduplicated, unordered set of candidates for one domain.
///
/// Labels are compared case-insensitively; the first origin seen for a label wins.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    inner: HashMap<String, Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the label was not present yet.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        match self.inner.entry(candidate.label.clone()) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(slot) => {
                slot.insert(candidate);
                true
            }
        }
    }

    /// Adds every usable label and returns how many were new.
    pub fn extend_labels<I, S>(&mut self, labels: I, origin: CandidateOrigin) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added: usize = 0;
        for candidate in labels
            .into_iter()
            .filter_map(|raw| Candidate::new(raw.as_ref(), origin))
        {
            if self.insert(candidate) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, label: &str) -> bool {
        self.inner.contains_key(&label.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.inner.values()
    }

    pub fn count_from(&self, origin: CandidateOrigin) -> usize {
        self.inner.values().filter(|c| c.origin == origin).count()
    }
}

impl IntoIterator for CandidateSet {
    type Item = Candidate;
    type IntoIter = hash_map::IntoValues<String, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_values()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CandidateSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set: CandidateSet = CandidateSet::new();
        set.extend_labels(iter, CandidateOrigin::Wordlist);
        set
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
